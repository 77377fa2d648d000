//! Video assembly handler.
//!
//! The richest invariant lives here: every slide must already carry
//! narration audio before the renderer is invoked. An incomplete deck is a
//! validation failure, not a transient one; re-running the job without
//! finishing narration first cannot succeed.

use tracing::warn;

use deckcast_models::{AssembleVideoPayload, Job, MediaFile, ProjectStatus};
use deckcast_storage::keys;

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::progress::{JobProgressWriter, RenderBand};

pub async fn assemble_video(
    ctx: &PipelineContext,
    job: &Job,
    payload: &AssembleVideoPayload,
) -> WorkerResult<()> {
    match run(ctx, job, payload).await {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Err(status_err) = ctx
                .datastore
                .update_project_status(&job.project_id, ProjectStatus::Failed)
                .await
            {
                warn!(
                    project_id = %job.project_id,
                    "Failed to mark project failed: {}", status_err
                );
            }
            Err(err)
        }
    }
}

async fn run(
    ctx: &PipelineContext,
    job: &Job,
    _payload: &AssembleVideoPayload,
) -> WorkerResult<()> {
    let logger = JobLogger::new(&job.id, "assemble_video");
    let progress = JobProgressWriter::new(ctx.datastore.clone(), job.id.clone());

    let project = ctx
        .datastore
        .get_project(&job.project_id)
        .await?
        .ok_or_else(|| WorkerError::ProjectNotFound(job.project_id.clone()))?;

    let settings = ctx
        .datastore
        .project_settings(&project.id)
        .await?
        .ok_or_else(|| WorkerError::SettingsNotFound(project.id.clone()))?;

    let slides = ctx.datastore.slides_for_project(&project.id).await?;
    if slides.is_empty() {
        return Err(WorkerError::NoSlides);
    }

    let missing = slides.iter().filter(|s| !s.has_audio()).count();
    if missing > 0 {
        return Err(WorkerError::MissingNarration { missing });
    }

    logger.log_start(&format!("Rendering {} slide(s)", slides.len()));
    progress.set(10).await?;

    let band = RenderBand::new(progress.clone());
    let rendered = ctx
        .renderer
        .render(&slides, &settings, &band)
        .await
        .map_err(WorkerError::Render)?;

    let video = tokio::fs::read(&rendered.path).await?;
    let video_key = keys::video_key(&project.id, &job.id);
    ctx.blobs.upload(&video_key, video, "video/mp4").await?;
    progress.set(95).await?;

    ctx.datastore
        .insert_media_file(MediaFile::video(
            project.id.clone(),
            video_key.clone(),
            rendered.duration_seconds,
            rendered.size_bytes,
        ))
        .await?;

    ctx.datastore
        .update_project_status(&project.id, ProjectStatus::Completed)
        .await?;

    logger.log_completion(&format!(
        "Video at {} ({:.1}s, {} bytes)",
        video_key, rendered.duration_seconds, rendered.size_bytes
    ));
    Ok(())
}
