//! Error taxonomy shared by every profile operation.
//!
//! Each [`McpError`] variant maps onto the dotted `errorCode` strings, numeric
//! codes and HTTP statuses that game clients already understand. Handlers only
//! construct errors; turning them into a wire envelope happens once, through
//! [`McpError::to_envelope`].
//!
//! # Design Principles
//!
//! - **Fail before mutating**: validation and domain errors are raised before
//!   any profile is touched, so a failed operation never leaves partial state
//! - **Severity Classification**: errors are grouped by how a caller should react
//! - **Stable codes**: the dotted codes are part of the client contract

use serde::{Deserialize, Serialize};

use crate::response::ErrorEnvelope;

/// Severity level of an error, used for categorization and logging priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Malformed or missing input. Reported before any profile is read.
    Validation,

    /// The caller is not allowed to perform the operation on this target.
    Forbidden,

    /// An account, offer, item or purchase record does not exist.
    NotFound,

    /// A business rule rejected the operation (funds, ownership).
    Business,

    /// Persistence or consistency failure on the server side.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Business => "business",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error indicates a server-side problem.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Sub-kinds of parameter checks that carry their own error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterCheck {
    /// Generic value check (bad index, wrong slot category, quantity < 1).
    Value,
    /// String longer than allowed.
    StringLength,
    /// Gift wrap template outside the allow-list.
    GiftBox,
    /// Collection size outside its allowed range.
    QuantityRange,
    /// Collection contains duplicate entries.
    Duplicate,
    /// Identifier that does not resolve to anything usable.
    InvalidId,
}

impl ParameterCheck {
    const fn error_code(&self) -> &'static str {
        match self {
            Self::Value => "errors.com.epicgames.validation.validation_failed",
            Self::StringLength => "errors.com.epicgames.string.length_check",
            Self::GiftBox => "errors.com.epicgames.giftbox.invalid",
            Self::QuantityRange => "errors.com.epicgames.item.quantity.range_check",
            Self::Duplicate => "errors.com.epicgames.array.duplicate_found",
            Self::InvalidId => "errors.com.epicgames.fortnite.id_invalid",
        }
    }

    const fn numeric_code(&self) -> u32 {
        match self {
            Self::Value => 1040,
            _ => 16027,
        }
    }
}

/// Every failure an operation can report to the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum McpError {
    #[error("Validation Failed. [{}] field(s) is missing.", .fields.join(", "))]
    ValidationFailed { fields: Vec<String> },

    #[error("{message}")]
    InvalidParameter {
        check: ParameterCheck,
        message: String,
        vars: Vec<String>,
    },

    #[error("Unable to find template configuration for profile {profile_id}")]
    ProfileNotFound { profile_id: String },

    #[error("{operation} is not valid on {profile_id} profile")]
    InvalidCommand {
        operation: String,
        profile_id: String,
    },

    #[error("Operation {operation} not valid")]
    OperationNotFound { operation: String },

    #[error("Unable to find profiles for account {account_id}")]
    AccountNotFound { account_id: String },

    #[error("Account {account_id} already has profiles")]
    AccountExists { account_id: String },

    #[error("Offer ID (id: '{offer_id}') not found")]
    OfferNotFound { offer_id: String },

    #[error("Item (id: '{item_id}') not found")]
    ItemNotFound { item_id: String },

    #[error("Purchase (id: '{purchase_id}') not found")]
    PurchaseNotFound { purchase_id: String },

    #[error("You can not afford this item ({required}), you only have {available}.")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("You have already bought this item before.")]
    AlreadyOwned { template_id: String },

    #[error("User {sender} is not friends with {receiver}")]
    NotFriends { sender: String, receiver: String },

    #[error("User {receiver} has disabled receiving gifts.")]
    GiftsDisabled { receiver: String },

    #[error("{feature} is disabled")]
    FeatureDisabled { feature: String },

    #[error("Account has already reached level {max_level}")]
    MaxLevelReached { max_level: i64 },

    #[error("Failed to update profile {profile_id}: {reason}")]
    UpdateFailed { profile_id: String, reason: String },

    #[error("Profiles of {failed} could not be written after {} committed", .written.join(", "))]
    PartialCommit { written: Vec<String>, failed: String },
}

impl McpError {
    /// Builds a validation error for the given missing field names.
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ValidationFailed {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a parameter error with a custom message.
    pub fn invalid(check: ParameterCheck, message: impl Into<String>, vars: Vec<String>) -> Self {
        Self::InvalidParameter {
            check,
            message: message.into(),
            vars,
        }
    }

    pub fn invalid_command(operation: &str, profile_id: &str) -> Self {
        Self::InvalidCommand {
            operation: operation.to_owned(),
            profile_id: profile_id.to_owned(),
        }
    }

    /// Returns the severity level of this error.
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ValidationFailed { .. }
            | Self::InvalidParameter { .. }
            | Self::InvalidCommand { .. } => ErrorSeverity::Validation,
            Self::ProfileNotFound { .. }
            | Self::NotFriends { .. }
            | Self::GiftsDisabled { .. }
            | Self::FeatureDisabled { .. } => ErrorSeverity::Forbidden,
            Self::OperationNotFound { .. }
            | Self::AccountNotFound { .. }
            | Self::OfferNotFound { .. }
            | Self::ItemNotFound { .. }
            | Self::PurchaseNotFound { .. } => ErrorSeverity::NotFound,
            Self::InsufficientFunds { .. }
            | Self::AlreadyOwned { .. }
            | Self::AccountExists { .. }
            | Self::MaxLevelReached { .. } => ErrorSeverity::Business,
            Self::UpdateFailed { .. } | Self::PartialCommit { .. } => ErrorSeverity::Internal,
        }
    }

    /// Returns the dotted error code reported to clients.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "errors.com.epicgames.validation.validation_failed",
            Self::InvalidParameter { check, .. } => check.error_code(),
            Self::ProfileNotFound { .. } => "errors.com.epicgames.modules.profiles.operation_forbidden",
            Self::InvalidCommand { .. } => "errors.com.epicgames.modules.profiles.invalid_command",
            Self::OperationNotFound { .. } => "errors.com.epicgames.fortnite.operation_not_found",
            Self::AccountNotFound { .. } => "errors.com.epicgames.modules.profiles.not_found",
            Self::AccountExists { .. } => "errors.com.epicgames.modules.profiles.already_exists",
            Self::OfferNotFound { .. } => "errors.com.epicgames.fortnite.id_invalid",
            Self::ItemNotFound { .. } => "errors.com.epicgames.fortnite.item_not_found",
            Self::PurchaseNotFound { .. } => "errors.com.epicgames.common.not_found",
            Self::InsufficientFunds { .. } => "errors.com.epicgames.currency.mtx.insufficient",
            Self::AlreadyOwned { .. } => "errors.com.epicgames.offer.already_owned",
            Self::NotFriends { .. } => "errors.com.epicgames.friends.no_relationship",
            Self::GiftsDisabled { .. } => "errors.com.epicgames.user.gift_disabled",
            Self::FeatureDisabled { .. } => "errors.com.epicgames.fortnite.sac_disabled",
            Self::MaxLevelReached { .. } => "errors.com.epicgames.fortnite.max_level",
            Self::UpdateFailed { .. } | Self::PartialCommit { .. } => {
                "errors.com.epicgames.modules.profiles.update_failed"
            }
        }
    }

    /// Returns the numeric error code reported to clients.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::ValidationFailed { .. } => 1040,
            Self::InvalidParameter { check, .. } => check.numeric_code(),
            Self::ProfileNotFound { .. } => 12813,
            Self::InvalidCommand { .. } => 12801,
            Self::OperationNotFound { .. } => 16035,
            Self::AccountNotFound { .. } => 12804,
            Self::AccountExists { .. } => 12805,
            Self::OfferNotFound { .. } => 16027,
            Self::ItemNotFound { .. } => 16006,
            Self::PurchaseNotFound { .. } => 1004,
            Self::InsufficientFunds { .. } | Self::AlreadyOwned { .. } => 1040,
            Self::NotFriends { .. } | Self::GiftsDisabled { .. } => 28004,
            Self::FeatureDisabled { .. } | Self::MaxLevelReached { .. } => 12801,
            Self::UpdateFailed { .. } | Self::PartialCommit { .. } => 50001,
        }
    }

    /// Returns the HTTP status that accompanies this error.
    pub const fn status(&self) -> u16 {
        match self {
            Self::ProfileNotFound { .. }
            | Self::NotFriends { .. }
            | Self::GiftsDisabled { .. }
            | Self::FeatureDisabled { .. } => 403,
            Self::OperationNotFound { .. }
            | Self::AccountNotFound { .. }
            | Self::ItemNotFound { .. }
            | Self::PurchaseNotFound { .. } => 404,
            Self::AccountExists { .. } => 409,
            Self::UpdateFailed { .. } | Self::PartialCommit { .. } => 500,
            _ => 400,
        }
    }

    /// Values interpolated into the client-side localized message.
    pub fn message_vars(&self) -> Vec<String> {
        match self {
            Self::ValidationFailed { fields } => vec![format!("[{}]", fields.join(", "))],
            Self::InvalidParameter { vars, .. } => vars.clone(),
            Self::ProfileNotFound { profile_id } => vec![profile_id.clone()],
            Self::InvalidCommand {
                operation,
                profile_id,
            } => vec![operation.clone(), profile_id.clone()],
            Self::OperationNotFound { operation } => vec![operation.clone()],
            Self::AccountNotFound { account_id } | Self::AccountExists { account_id } => {
                vec![account_id.clone()]
            }
            Self::OfferNotFound { offer_id } => vec![offer_id.clone()],
            Self::ItemNotFound { item_id } => vec![item_id.clone()],
            Self::PurchaseNotFound { purchase_id } => vec![purchase_id.clone()],
            Self::InsufficientFunds {
                required,
                available,
            } => vec![required.to_string(), available.to_string()],
            Self::AlreadyOwned { template_id } => vec![template_id.clone()],
            Self::NotFriends { sender, receiver } => vec![sender.clone(), receiver.clone()],
            Self::GiftsDisabled { receiver } => vec![receiver.clone()],
            Self::FeatureDisabled { .. }
            | Self::MaxLevelReached { .. }
            | Self::UpdateFailed { .. }
            | Self::PartialCommit { .. } => Vec::new(),
        }
    }

    /// Renders this error into the client error envelope.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(
            self.error_code(),
            self.to_string(),
            self.message_vars(),
            self.numeric_code(),
            self.status(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_fields() {
        let err = McpError::missing(["offerId", "purchaseQuantity"]);
        assert_eq!(
            err.to_string(),
            "Validation Failed. [offerId, purchaseQuantity] field(s) is missing."
        );
        assert_eq!(err.numeric_code(), 1040);
        assert_eq!(err.message_vars(), vec!["[offerId, purchaseQuantity]"]);
    }

    #[test]
    fn forbidden_profile_maps_to_403() {
        let err = McpError::ProfileNotFound {
            profile_id: "campaign".into(),
        };
        assert_eq!(err.status(), 403);
        assert_eq!(err.numeric_code(), 12813);
        assert_eq!(err.severity(), ErrorSeverity::Forbidden);
    }

    #[test]
    fn parameter_checks_keep_their_codes() {
        let err = McpError::invalid(ParameterCheck::GiftBox, "The giftbox you provided is invalid.", vec![]);
        assert_eq!(err.error_code(), "errors.com.epicgames.giftbox.invalid");
        assert_eq!(err.numeric_code(), 16027);
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn persistence_errors_are_internal() {
        let err = McpError::PartialCommit {
            written: vec!["sender".into()],
            failed: "friend".into(),
        };
        assert!(err.severity().is_internal());
        assert_eq!(err.status(), 500);
    }
}
