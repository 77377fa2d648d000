//! Shared data models for the Deckcast backend.
//!
//! This crate provides Serde-serializable types for:
//! - Projects and per-project settings
//! - Slides with narration pacing
//! - Jobs with typed per-stage payloads
//! - Media file artifact records

pub mod job;
pub mod media_file;
pub mod payload;
pub mod project;
pub mod slide;

// Re-export common types
pub use job::{Job, JobId, JobStatus, JobType};
pub use media_file::{MediaFile, MediaFileType};
pub use payload::{
    AssembleVideoPayload, ExtractStructurePayload, JobPayload, PayloadError,
    SynthesizeNarrationPayload,
};
pub use project::{Project, ProjectId, ProjectSettings, ProjectStatus};
pub use slide::{narration_seconds, Slide, SlideId, SlideStatus, CHARS_PER_SECOND};
