//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Poll interval between pending-job scans
    pub poll_interval: Duration,
    /// Maximum jobs claimed per tick
    pub batch_size: usize,
    /// Back-off after a failed tick
    pub tick_backoff: Duration,
    /// Hard per-job deadline; a stuck external call fails the job instead
    /// of blocking the rest of the batch forever
    pub job_timeout: Duration,
    /// Work directory for temporary render output
    pub work_dir: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            batch_size: 5,
            tick_backoff: Duration::from_secs(5),
            job_timeout: Duration::from_secs(3600),
            work_dir: "/tmp/deckcast".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_millis(
                std::env::var("JOB_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            ),
            batch_size: std::env::var("WORKER_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            tick_backoff: Duration::from_secs(
                std::env::var("WORKER_TICK_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            job_timeout: Duration::from_secs(
                std::env::var("WORKER_JOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            work_dir: std::env::var("WORKER_WORK_DIR")
                .unwrap_or_else(|_| "/tmp/deckcast".to_string()),
        }
    }
}
