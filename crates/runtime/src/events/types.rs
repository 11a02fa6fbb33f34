//! Event types for different topics.

use profile_core::Notification;
use serde::{Deserialize, Serialize};

/// Events about stored profile documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProfileEvent {
    /// Profiles of a new account were stored.
    Registered { account_id: String },

    /// An operation's writes were persisted.
    Committed {
        account_id: String,
        operation: String,
        /// Sub-profiles written, each bumped once.
        profile_ids: Vec<String>,
        /// Revision of the request's primary profile after the call.
        rvn: i64,
    },

    /// An account's profiles were deleted.
    Deleted { account_id: String },
}

/// A notification addressed to one account, published for whichever
/// connection currently serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftEvent {
    pub recipient: String,
    pub notification: Notification,
}
