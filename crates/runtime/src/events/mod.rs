//! Topic-based event bus for runtime events.
//!
//! Committed mutations are published on [`Topic::Profile`]; gift
//! notifications go out on [`Topic::Gift`] through a [`Messenger`].

mod bus;
mod messenger;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use messenger::{BusMessenger, Messenger, NullMessenger};
pub use types::{GiftEvent, ProfileEvent};
