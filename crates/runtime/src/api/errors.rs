//! Unified error types surfaced by the runtime API.
//!
//! Wraps engine rejections, store failures and lock failures so the service
//! layer can turn any of them into one client error envelope.
use profile_core::{ErrorEnvelope, McpError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("account lock table was poisoned")]
    LockPoisoned,

    #[error("runtime requires content to be configured before building")]
    MissingContent,
}

impl RuntimeError {
    /// The client-visible error this failure maps to.
    ///
    /// Store failures surface as `UpdateFailed`; the in-memory mutation that
    /// preceded them has already been discarded.
    pub fn to_mcp(&self) -> McpError {
        match self {
            RuntimeError::Mcp(err) => err.clone(),
            RuntimeError::Repository(RepositoryError::NotFound(account_id)) => McpError::AccountNotFound {
                account_id: account_id.clone(),
            },
            RuntimeError::Repository(RepositoryError::AlreadyExists(account_id)) => McpError::AccountExists {
                account_id: account_id.clone(),
            },
            RuntimeError::Repository(RepositoryError::Conflict { profile_id, .. }) => McpError::UpdateFailed {
                profile_id: profile_id.clone(),
                reason: self.to_string(),
            },
            other => McpError::UpdateFailed {
                profile_id: String::new(),
                reason: other.to_string(),
            },
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        self.to_mcp().to_envelope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_surface_as_update_failures() {
        let err = RuntimeError::from(RepositoryError::Conflict {
            account_id: "acc".into(),
            profile_id: "athena".into(),
            expected: 3,
            found: 4,
        });
        let envelope = err.to_envelope();
        assert_eq!(envelope.status, 500);
        assert_eq!(envelope.numeric_error_code, 50001);
    }

    #[test]
    fn engine_errors_pass_through() {
        let err = RuntimeError::from(McpError::AccountNotFound {
            account_id: "ghost".into(),
        });
        assert_eq!(err.to_envelope().status, 404);
    }
}
