//! Project and project settings models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Generate a new random project ID.
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

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Created, no source deck processed yet
    #[default]
    Draft,
    /// Slides extracted, scripts editable
    Editing,
    /// A narration job has been requested
    NarrationGenerating,
    /// An assembly job has been requested
    VideoGenerating,
    /// Final video produced
    Completed,
    /// A narration or assembly stage failed
    Failed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Editing => "editing",
            ProjectStatus::NarrationGenerating => "narration_generating",
            ProjectStatus::VideoGenerating => "video_generating",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A slide presentation project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    /// Unique project ID
    pub id: ProjectId,

    /// User ID (owner)
    pub owner_id: String,

    /// Project title
    pub title: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: ProjectStatus,

    /// Blob key of the uploaded source deck
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file_path: Option<String>,

    /// Number of extracted slides
    #[serde(default)]
    pub slide_count: u32,

    /// Sum of per-slide narration estimates, in seconds
    #[serde(default)]
    pub total_estimated_seconds: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new draft project.
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            owner_id: owner_id.into(),
            title: title.into(),
            description: None,
            status: ProjectStatus::Draft,
            source_file_path: None,
            slide_count: 0,
            total_estimated_seconds: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach an uploaded source deck.
    pub fn with_source_file(mut self, path: impl Into<String>) -> Self {
        self.source_file_path = Some(path.into());
        self.updated_at = Utc::now();
        self
    }

    /// Mark as completed.
    pub fn complete(mut self) -> Self {
        self.status = ProjectStatus::Completed;
        self.updated_at = Utc::now();
        self
    }

    /// Mark as failed.
    pub fn fail(mut self) -> Self {
        self.status = ProjectStatus::Failed;
        self.updated_at = Utc::now();
        self
    }
}

/// Per-project narration and rendering defaults.
///
/// One row per project; the narration and assembly stages refuse to run
/// without it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSettings {
    /// Owning project
    pub project_id: ProjectId,

    /// Default narration voice
    pub default_voice: String,

    /// Default narration speed multiplier
    pub default_speed: f32,

    /// Pause inserted between slides, in milliseconds
    #[serde(default = "default_pause_ms")]
    pub default_pause_ms: u32,

    /// Output resolution, e.g. "1920x1080"
    #[serde(default = "default_resolution")]
    pub video_resolution: String,

    /// Output frame rate
    #[serde(default = "default_fps")]
    pub video_fps: u32,
}

fn default_pause_ms() -> u32 {
    500
}

fn default_resolution() -> String {
    "1920x1080".to_string()
}

fn default_fps() -> u32 {
    30
}

impl ProjectSettings {
    /// Settings with stock defaults for a project.
    pub fn defaults(project_id: ProjectId) -> Self {
        Self {
            project_id,
            default_voice: "alloy".to_string(),
            default_speed: 1.0,
            default_pause_ms: default_pause_ms(),
            video_resolution: default_resolution(),
            video_fps: default_fps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = Project::new("user123", "Quarterly Training");
        assert_eq!(project.status, ProjectStatus::Draft);
        assert_eq!(project.slide_count, 0);
        assert!(project.source_file_path.is_none());
    }

    #[test]
    fn test_project_lifecycle_mutators() {
        let project = Project::new("user123", "Deck")
            .with_source_file("projects/p1/source/deck.pptx");
        assert!(project.source_file_path.is_some());

        let failed = project.clone().fail();
        assert_eq!(failed.status, ProjectStatus::Failed);

        let completed = project.complete();
        assert_eq!(completed.status, ProjectStatus::Completed);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = ProjectSettings::defaults(ProjectId::new());
        assert_eq!(settings.default_speed, 1.0);
        assert_eq!(settings.video_fps, 30);
        assert_eq!(settings.default_pause_ms, 500);
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&ProjectStatus::NarrationGenerating).unwrap();
        assert_eq!(json, "\"narration_generating\"");
    }
}
