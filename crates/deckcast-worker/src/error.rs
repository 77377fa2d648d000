//! Worker error types.

use deckcast_datastore::DatastoreError;
use deckcast_models::{PayloadError, ProjectId};
use deckcast_storage::StorageError;
use thiserror::Error;

use crate::capabilities::CapabilityError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    #[error("project settings not found for {0}")]
    SettingsNotFound(ProjectId),

    #[error("no source file uploaded for project {0}")]
    MissingSourceFile(ProjectId),

    #[error("no slides to process")]
    NoSlides,

    #[error("{missing} slide(s) do not have narration audio")]
    MissingNarration { missing: usize },

    #[error("unknown job type: {0}")]
    UnknownJobType(String),

    #[error("job timed out after {0}s")]
    JobTimeout(u64),

    #[error("invalid job payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("structure extraction failed: {0}")]
    Extraction(#[source] CapabilityError),

    #[error("narration synthesis failed: {0}")]
    Narration(#[source] CapabilityError),

    #[error("video rendering failed: {0}")]
    Render(#[source] CapabilityError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Datastore error: {0}")]
    Datastore(#[from] DatastoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// True for validation failures detected before any external capability
    /// was invoked. Retrying these without changing the underlying data
    /// cannot succeed; a new job only makes sense after the precondition is
    /// met.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            WorkerError::ProjectNotFound(_)
                | WorkerError::SettingsNotFound(_)
                | WorkerError::MissingSourceFile(_)
                | WorkerError::NoSlides
                | WorkerError::MissingNarration { .. }
                | WorkerError::Payload(_)
        )
    }

    /// True when the failure came from a pluggable external capability
    /// rather than this core's own data handling.
    pub fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            WorkerError::Extraction(_) | WorkerError::Narration(_) | WorkerError::Render(_)
        )
    }
}
