//! Media file artifact records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::project::ProjectId;
use crate::slide::SlideId;

/// Kind of stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaFileType {
    /// Uploaded source deck
    Source,
    /// Rendered still of one slide
    SlideImage,
    /// Synthesized narration audio
    Audio,
    /// Assembled video
    Video,
}

impl MediaFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFileType::Source => "source",
            MediaFileType::SlideImage => "slide_image",
            MediaFileType::Audio => "audio",
            MediaFileType::Video => "video",
        }
    }
}

impl fmt::Display for MediaFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of a produced artifact.
///
/// Rows are insert-only; a newer row of the same type supersedes older ones
/// (most-recent-by-type query pattern).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaFile {
    /// Unique record ID
    pub id: String,

    /// Owning project
    pub project_id: ProjectId,

    /// Originating slide, for per-slide artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_id: Option<SlideId>,

    /// Artifact kind
    pub file_type: MediaFileType,

    /// Blob key
    pub path: String,

    /// Playback length in seconds, where applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,

    /// Stored size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MediaFile {
    /// Record for an assembled video.
    pub fn video(
        project_id: ProjectId,
        path: impl Into<String>,
        duration_sec: f64,
        size_bytes: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            slide_id: None,
            file_type: MediaFileType::Video,
            path: path.into(),
            duration_sec: Some(duration_sec),
            size_bytes: Some(size_bytes),
            created_at: Utc::now(),
        }
    }

    /// Record for one slide's narration audio.
    pub fn audio(
        project_id: ProjectId,
        slide_id: SlideId,
        path: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            slide_id: Some(slide_id),
            file_type: MediaFileType::Audio,
            path: path.into(),
            duration_sec: None,
            size_bytes: Some(size_bytes),
            created_at: Utc::now(),
        }
    }
}
