//! The job poller.
//!
//! A single cooperative timer loop: each tick fetches a bounded FIFO batch
//! of pending jobs, claims them one at a time and runs the matching stage
//! handler to completion before touching the next job. The poller is the
//! only place that writes terminal job states, and the only place handler
//! errors are caught.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, error, info};

use deckcast_models::{Job, JobPayload, JobType};

use crate::config::WorkerConfig;
use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::handlers;

/// Claims pending jobs and dispatches them to stage handlers.
pub struct Poller {
    ctx: Arc<PipelineContext>,
    config: WorkerConfig,
    shutdown: watch::Sender<bool>,
}

impl Poller {
    /// Create a new poller.
    pub fn new(ctx: Arc<PipelineContext>, config: WorkerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx,
            config,
            shutdown,
        }
    }

    /// Run the poll loop until shutdown is signalled.
    pub async fn run(&self) {
        info!(
            "Starting job poller (interval: {:?}, batch size: {})",
            self.config.poll_interval, self.config.batch_size
        );

        let mut shutdown_rx = self.shutdown.subscribe();
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping poller");
                        break;
                    }
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("Poll tick failed: {}", e);
                        // Back off so a sick datastore is not hammered
                        tokio::time::sleep(self.config.tick_backoff).await;
                    }
                }
            }
        }

        info!("Job poller stopped");
    }

    /// Signal shutdown. The current job runs to completion first.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// One poll cycle: fetch, claim and process a batch of pending jobs.
    ///
    /// Returns the number of jobs processed. Handler failures are recorded
    /// on the job row and never abort the batch; only datastore failures on
    /// the fetch itself surface as an error.
    pub async fn tick(&self) -> WorkerResult<usize> {
        let batch = self
            .ctx
            .datastore
            .pending_jobs(self.config.batch_size)
            .await?;

        if batch.is_empty() {
            return Ok(0);
        }
        debug!("Found {} pending job(s)", batch.len());

        let mut processed = 0;
        for job in batch {
            // Conditional pending -> running update; losing the race means
            // another poller owns the job now.
            let claimed = match self.ctx.datastore.claim_job(&job.id).await? {
                Some(j) => j,
                None => {
                    debug!(job_id = %job.id, "Job no longer pending, skipping");
                    continue;
                }
            };
            self.process(claimed).await;
            processed += 1;
        }
        Ok(processed)
    }

    /// Run one claimed job and record its terminal state.
    async fn process(&self, job: Job) {
        info!(job_id = %job.id, job_type = %job.job_type, "Executing job");

        let outcome = tokio::time::timeout(self.config.job_timeout, self.dispatch(&job))
            .await
            .unwrap_or(Err(WorkerError::JobTimeout(
                self.config.job_timeout.as_secs(),
            )));

        match outcome {
            Ok(()) => {
                counter!("deckcast_jobs_succeeded_total").increment(1);
                if let Err(e) = self.ctx.datastore.complete_job(&job.id).await {
                    error!(job_id = %job.id, "Failed to record job success: {}", e);
                    return;
                }
                info!(job_id = %job.id, "Job completed successfully");
            }
            Err(err) => {
                counter!("deckcast_jobs_failed_total").increment(1);
                error!(job_id = %job.id, "Job failed: {}", err);
                if let Err(e) = self
                    .ctx
                    .datastore
                    .fail_job(&job.id, &err.to_string())
                    .await
                {
                    error!(job_id = %job.id, "Failed to record job failure: {}", e);
                }
            }
        }
    }

    /// Route a job to its stage handler.
    async fn dispatch(&self, job: &Job) -> WorkerResult<()> {
        if let JobType::Unknown(s) = &job.job_type {
            return Err(WorkerError::UnknownJobType(s.clone()));
        }

        match job.typed_payload()? {
            JobPayload::ExtractStructure(payload) => {
                handlers::extract_structure(&self.ctx, job, &payload).await
            }
            JobPayload::SynthesizeNarration(payload) => {
                handlers::synthesize_narration(&self.ctx, job, &payload).await
            }
            JobPayload::AssembleVideo(payload) => {
                handlers::assemble_video(&self.ctx, job, &payload).await
            }
        }
    }
}
