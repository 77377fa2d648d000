//! Job progress plumbing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use deckcast_datastore::Datastore;
use deckcast_models::JobId;

use crate::capabilities::RenderProgress;
use crate::error::WorkerResult;

/// Writes checkpoint progress for one job through the datastore.
///
/// Writes are visible to pollers of other stages immediately; the datastore
/// enforces the 0-100 clamp and monotonicity.
#[derive(Clone)]
pub struct JobProgressWriter {
    datastore: Arc<dyn Datastore>,
    job_id: JobId,
}

impl JobProgressWriter {
    pub fn new(datastore: Arc<dyn Datastore>, job_id: JobId) -> Self {
        Self { datastore, job_id }
    }

    /// Write a progress checkpoint.
    pub async fn set(&self, percent: u8) -> WorkerResult<()> {
        self.datastore
            .update_job_progress(&self.job_id, percent)
            .await?;
        Ok(())
    }
}

/// Maps renderer-reported 0-100 into the job's 10-90 band.
///
/// The first 10% of an assembly job is setup, the last 10% is upload and
/// bookkeeping; rendering owns the band in between.
pub struct RenderBand {
    writer: JobProgressWriter,
}

impl RenderBand {
    pub fn new(writer: JobProgressWriter) -> Self {
        Self { writer }
    }

    fn scale(percent: u8) -> u8 {
        10 + (percent.min(100) as u16 * 80 / 100) as u8
    }
}

#[async_trait]
impl RenderProgress for RenderBand {
    async fn update(&self, percent: u8) {
        let scaled = Self::scale(percent);
        if let Err(e) = self.writer.set(scaled).await {
            warn!(job_id = %self.writer.job_id, "Failed to write render progress: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_band_scaling() {
        assert_eq!(RenderBand::scale(0), 10);
        assert_eq!(RenderBand::scale(50), 50);
        assert_eq!(RenderBand::scale(100), 90);
        // out-of-range input is clamped, keeping the band honest
        assert_eq!(RenderBand::scale(250), 90);
    }
}
