//! Slide models and narration pacing.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::project::ProjectId;

/// Narration pace: characters spoken per second (~400 characters/minute).
pub const CHARS_PER_SECOND: f64 = 6.67;

/// Estimated narration length in whole seconds for a script of
/// `char_count` characters, rounded up.
pub fn narration_seconds(char_count: u32) -> u32 {
    (char_count as f64 / CHARS_PER_SECOND).ceil() as u32
}

/// Unique identifier for a slide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SlideId(pub String);

impl SlideId {
    /// Generate a new random slide ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SlideId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SlideId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SlideId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Per-slide narration stage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlideStatus {
    /// Script editable, narration not requested
    #[default]
    Draft,
    /// Queued for narration
    NarrationPending,
    /// Narration in flight
    NarrationGenerating,
    /// Audio synthesized and stored
    NarrationDone,
    /// Narration failed for this slide
    NarrationFailed,
}

impl SlideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideStatus::Draft => "draft",
            SlideStatus::NarrationPending => "narration_pending",
            SlideStatus::NarrationGenerating => "narration_generating",
            SlideStatus::NarrationDone => "narration_done",
            SlideStatus::NarrationFailed => "narration_failed",
        }
    }
}

impl fmt::Display for SlideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One slide of a project.
///
/// `(project_id, slide_index)` is unique; `slide_index` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Slide {
    /// Unique slide ID
    pub id: SlideId,

    /// Owning project
    pub project_id: ProjectId,

    /// 1-based position within the deck
    pub slide_index: u32,

    /// Slide title from the source deck
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Text as extracted from the source deck
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    /// Machine-generated narration script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_script: Option<String>,

    /// User-edited narration script; wins over the generated one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_script: Option<String>,

    /// Character count of the authoritative script
    #[serde(default)]
    pub char_count: u32,

    /// Estimated narration length, `ceil(char_count / 6.67)`
    #[serde(default)]
    pub estimated_seconds: u32,

    /// Per-slide voice override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_override: Option<String>,

    /// Per-slide speed override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_override: Option<f32>,

    /// Blob key of the synthesized audio, once available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file_path: Option<String>,

    /// Blob key of the rendered slide image, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    /// Narration stage status
    #[serde(default)]
    pub status: SlideStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Slide {
    /// Create a freshly extracted slide.
    ///
    /// Both script fields are seeded from the extracted text and the
    /// pacing fields are derived from it.
    pub fn from_extracted(
        project_id: ProjectId,
        slide_index: u32,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let char_count = text.chars().count() as u32;
        let now = Utc::now();

        Self {
            id: SlideId::new(),
            project_id,
            slide_index,
            title: Some(title.into()),
            original_text: Some(text.clone()),
            generated_script: Some(text),
            edited_script: None,
            char_count,
            estimated_seconds: narration_seconds(char_count),
            voice_override: None,
            speed_override: None,
            audio_file_path: None,
            image_path: None,
            status: SlideStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// The authoritative narration script: `edited_script` when non-empty,
    /// else `generated_script` when non-empty.
    pub fn active_script(&self) -> Option<&str> {
        self.edited_script
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.generated_script.as_deref().filter(|s| !s.is_empty()))
    }

    /// Whether narration audio has been synthesized for this slide.
    pub fn has_audio(&self) -> bool {
        self.audio_file_path.is_some()
    }

    /// Replace the edited script and re-derive the pacing fields.
    pub fn edit_script(&mut self, script: impl Into<String>) {
        let script = script.into();
        self.char_count = script.chars().count() as u32;
        self.estimated_seconds = narration_seconds(self.char_count);
        self.edited_script = Some(script);
        self.updated_at = Utc::now();
    }
}
