//! Fire-and-forget delivery of notifications to other accounts.

use profile_core::Notification;

use super::bus::{Event, EventBus};
use super::types::GiftEvent;

/// Pushes a notification to an account's live connection, if it has one.
///
/// Delivery is not guaranteed; `notify` reports whether anyone was listening
/// so the caller can log a miss, never so it can fail the operation.
pub trait Messenger: Send + Sync {
    fn notify(&self, account_id: &str, notification: &Notification) -> bool;
}

/// Messenger that publishes onto the [`Topic::Gift`](super::Topic::Gift) channel.
#[derive(Clone)]
pub struct BusMessenger {
    bus: EventBus,
}

impl BusMessenger {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl Messenger for BusMessenger {
    fn notify(&self, account_id: &str, notification: &Notification) -> bool {
        let event = Event::Gift(GiftEvent {
            recipient: account_id.to_owned(),
            notification: notification.clone(),
        });
        self.bus.publish(event) > 0
    }
}

/// Messenger that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMessenger;

impl Messenger for NullMessenger {
    fn notify(&self, _account_id: &str, _notification: &Notification) -> bool {
        false
    }
}
