//! Datastore error types.

use deckcast_models::JobStatus;
use thiserror::Error;

/// Result type for datastore operations.
pub type DatastoreResult<T> = Result<T, DatastoreError>;

/// Errors that can occur during datastore operations.
#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

impl DatastoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// True when the failure is a state-machine guard rejection rather than
    /// a backend fault.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, DatastoreError::InvalidTransition { .. })
    }
}
