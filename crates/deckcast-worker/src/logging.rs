//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for job processing with
//! tracing spans and contextual information.

use deckcast_models::JobId;
use tracing::{error, info, warn, Span};

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    stage: String,
}

impl JobLogger {
    /// Create a new job logger for a specific job and pipeline stage.
    pub fn new(job_id: &JobId, stage: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            stage: stage.to_string(),
        }
    }

    /// Log the start of a job.
    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            stage = %self.stage,
            "Job started: {}", message
        );
    }

    /// Log a progress update during job execution.
    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            stage = %self.stage,
            "Job progress: {}", message
        );
    }

    /// Log a warning during job execution.
    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            stage = %self.stage,
            "Job warning: {}", message
        );
    }

    /// Log an error during job execution.
    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            stage = %self.stage,
            "Job error: {}", message
        );
    }

    /// Log the completion of a job.
    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            stage = %self.stage,
            "Job completed: {}", message
        );
    }

    /// Get the job ID.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            stage = %self.stage
        )
    }
}
