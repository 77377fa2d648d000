//! Job records and the job lifecycle state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::payload::{JobPayload, PayloadError};
use crate::project::ProjectId;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
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

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage a job belongs to.
///
/// Persisted rows may carry type strings this build does not know; those
/// deserialize into `Unknown` and are failed at dispatch with the offending
/// string preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Parse the uploaded deck into slide rows
    ExtractStructure,
    /// Synthesize narration audio for slides
    SynthesizeNarration,
    /// Render and publish the final video
    AssembleVideo,
    /// Unrecognized type string from the datastore
    #[serde(untagged)]
    Unknown(String),
}

impl JobType {
    pub fn as_str(&self) -> &str {
        match self {
            JobType::ExtractStructure => "extract_structure",
            JobType::SynthesizeNarration => "synthesize_narration",
            JobType::AssembleVideo => "assemble_video",
            JobType::Unknown(s) => s,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Hand-written: the untagged fallback variant serializes as a bare string,
// which the derive cannot express.
impl JsonSchema for JobType {
    fn schema_name() -> String {
        "JobType".to_string()
    }

    fn json_schema(_: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        schemars::schema::SchemaObject {
            instance_type: Some(schemars::schema::InstanceType::String.into()),
            ..Default::default()
        }
        .into()
    }
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting to be claimed by a poller
    #[default]
    Pending,
    /// Claimed and executing
    Running,
    /// Finished successfully
    Success,
    /// Finished with an error
    Failed,
    /// Terminated by external intervention; never set by the core
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Success | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// State machine guard: `pending → running → {success, failed}`.
    ///
    /// `cancelled` is reachable only outside the core's write path, so no
    /// transition into it is valid here.
    pub fn can_transition(&self, to: JobStatus) -> bool {
        matches!(
            (self, to),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Success)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A durable record of one asynchronous unit of pipeline work.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Owning project
    pub project_id: ProjectId,

    /// Pipeline stage
    pub job_type: JobType,

    /// Lifecycle status
    #[serde(default)]
    pub status: JobStatus,

    /// Stage-specific parameters, decoded via [`Job::payload`]
    #[serde(default)]
    pub payload: serde_json::Value,

    /// Progress 0-100, monotone while running
    #[serde(default)]
    pub progress: u8,

    /// Error message, set only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Claim timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Completion timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new pending job.
    pub fn new(project_id: ProjectId, job_type: JobType, payload: serde_json::Value) -> Self {
        Self {
            id: JobId::new(),
            project_id,
            job_type,
            status: JobStatus::Pending,
            payload,
            progress: 0,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Decode the free-form payload into the typed shape for this job's
    /// stage.
    pub fn typed_payload(&self) -> Result<JobPayload, PayloadError> {
        JobPayload::decode(&self.job_type, &self.payload)
    }

    /// Claim the job: `pending → running`.
    pub fn start(mut self) -> Self {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
        self
    }

    /// Finish successfully: `running → success`, progress pinned to 100.
    pub fn complete(mut self) -> Self {
        self.status = JobStatus::Success;
        self.progress = 100;
        self.finished_at = Some(Utc::now());
        self
    }

    /// Finish with an error: `running → failed`.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self.finished_at = Some(Utc::now());
        self
    }

    /// Clamped, monotone progress update.
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = self.progress.max(progress.min(100));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = Job::new(
            ProjectId::new(),
            JobType::ExtractStructure,
            serde_json::json!({ "reparse": true }),
        );
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
        assert!(job.started_at.is_none());
    }

    #[test]
    fn test_job_lifecycle() {
        let job = Job::new(ProjectId::new(), JobType::AssembleVideo, serde_json::json!({}));

        let running = job.start();
        assert_eq!(running.status, JobStatus::Running);
        assert!(running.started_at.is_some());

        let done = running.clone().complete();
        assert_eq!(done.status, JobStatus::Success);
        assert_eq!(done.progress, 100);
        assert!(done.finished_at.is_some());

        let failed = running.fail("renderer exploded");
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some("renderer exploded"));
    }

    #[test]
    fn test_transition_guards() {
        assert!(JobStatus::Pending.can_transition(JobStatus::Running));
        assert!(JobStatus::Running.can_transition(JobStatus::Success));
        assert!(JobStatus::Running.can_transition(JobStatus::Failed));

        assert!(!JobStatus::Pending.can_transition(JobStatus::Success));
        assert!(!JobStatus::Success.can_transition(JobStatus::Running));
        assert!(!JobStatus::Failed.can_transition(JobStatus::Pending));
        assert!(!JobStatus::Running.can_transition(JobStatus::Cancelled));
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_progress_is_monotone_and_clamped() {
        let job = Job::new(ProjectId::new(), JobType::SynthesizeNarration, serde_json::json!({}))
            .start()
            .with_progress(40);
        assert_eq!(job.progress, 40);

        // A lower write is ignored, an overflow is clamped
        let job = job.with_progress(10);
        assert_eq!(job.progress, 40);
        let job = job.with_progress(150);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_unknown_job_type_round_trips() {
        let parsed: JobType = serde_json::from_str("\"thumbnail_sweep\"").unwrap();
        assert_eq!(parsed, JobType::Unknown("thumbnail_sweep".to_string()));
        assert_eq!(parsed.as_str(), "thumbnail_sweep");

        let known: JobType = serde_json::from_str("\"extract_structure\"").unwrap();
        assert_eq!(known, JobType::ExtractStructure);
        assert_eq!(
            serde_json::to_string(&JobType::SynthesizeNarration).unwrap(),
            "\"synthesize_narration\""
        );
    }
}
