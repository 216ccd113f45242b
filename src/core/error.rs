//! Registry error taxonomy
//!
//! Every mutating operation either fully succeeds or fails with one of these;
//! partial writes are never visible to subsequent reads. Errors carry enough
//! context (ids, current and requested states) for a precise user-facing
//! message, and none are swallowed - with one deliberate exception: notifier
//! failures are logged and suppressed so a notification outage never blocks a
//! document transition.

use thiserror::Error;

use crate::core::version::Status;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: Status,
        to: Status,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{actor} is not authorized for this action")]
    Unauthorized { actor: String },

    #[error("collaborator failure: {0}")]
    Dependency(String),

    #[error("registry storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Permanent user errors that must never be retried
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound(_)
                | RegistryError::InvalidTransition { .. }
                | RegistryError::Validation(_)
                | RegistryError::Unauthorized { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
