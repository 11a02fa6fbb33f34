//! Error types raised by profile store implementations.

use thiserror::Error;

/// Errors surfaced by profile store implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("profile store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("no profiles stored for account {0}")]
    NotFound(String),

    #[error("account {0} already has stored profiles")]
    AlreadyExists(String),

    #[error("account id {0:?} cannot be used as a storage key")]
    InvalidAccountId(String),

    #[error("profile {profile_id} of {account_id} is at rvn {found}, expected {expected}")]
    Conflict {
        account_id: String,
        profile_id: String,
        expected: i64,
        found: i64,
    },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
