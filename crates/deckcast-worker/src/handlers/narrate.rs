//! Narration synthesis handler.
//!
//! Synthesizes audio for every candidate slide in index order. Slides that
//! already carry audio are skipped unless the payload asks for
//! regeneration. A mid-loop failure marks the project failed but keeps the
//! audio of every slide finished before it.

use std::collections::HashSet;

use tracing::warn;

use deckcast_models::{
    Job, MediaFile, ProjectStatus, SlideStatus, SynthesizeNarrationPayload,
};
use deckcast_storage::keys;

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::progress::JobProgressWriter;

pub async fn synthesize_narration(
    ctx: &PipelineContext,
    job: &Job,
    payload: &SynthesizeNarrationPayload,
) -> WorkerResult<()> {
    match run(ctx, job, payload).await {
        Ok(()) => Ok(()),
        Err(err) => {
            // Synthesized audio stays usable; only the project regresses.
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
    payload: &SynthesizeNarrationPayload,
) -> WorkerResult<()> {
    let logger = JobLogger::new(&job.id, "synthesize_narration");
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

    let mut candidates = ctx.datastore.slides_for_project(&project.id).await?;
    if !payload.slide_ids.is_empty() {
        let wanted: HashSet<_> = payload.slide_ids.iter().collect();
        candidates.retain(|s| wanted.contains(&s.id));
    }
    if candidates.is_empty() {
        return Err(WorkerError::NoSlides);
    }

    logger.log_start(&format!("{} candidate slide(s)", candidates.len()));
    progress.set(10).await?;

    let total = candidates.len();
    for (position, slide) in candidates.iter().enumerate() {
        if slide.has_audio() && !payload.regenerate {
            logger.log_progress(&format!(
                "Slide {} already has audio, skipping",
                slide.slide_index
            ));
            continue;
        }

        let script = match slide.active_script() {
            Some(s) => s.to_owned(),
            None => {
                logger.log_warning(&format!(
                    "Slide {} has no script, skipping",
                    slide.slide_index
                ));
                continue;
            }
        };

        ctx.datastore
            .update_slide_status(&slide.id, SlideStatus::NarrationGenerating)
            .await?;

        // Slide-level override wins over the project default
        let voice = slide.voice_override.as_deref().unwrap_or(&settings.default_voice);
        let speed = slide.speed_override.unwrap_or(settings.default_speed);

        let audio = match ctx.narrator.synthesize(&script, voice, speed).await {
            Ok(bytes) => bytes,
            Err(err) => {
                if let Err(status_err) = ctx
                    .datastore
                    .update_slide_status(&slide.id, SlideStatus::NarrationFailed)
                    .await
                {
                    warn!(
                        slide_id = %slide.id,
                        "Failed to mark slide narration_failed: {}", status_err
                    );
                }
                return Err(WorkerError::Narration(err));
            }
        };

        let audio_key = keys::audio_key(&project.id, slide.slide_index);
        let size_bytes = audio.len() as u64;
        ctx.blobs.upload(&audio_key, audio, "audio/mpeg").await?;

        ctx.datastore.set_slide_audio(&slide.id, &audio_key).await?;
        ctx.datastore
            .insert_media_file(MediaFile::audio(
                project.id.clone(),
                slide.id.clone(),
                audio_key,
                size_bytes,
            ))
            .await?;

        // 10% setup, 10% finalization; the loop owns the band in between
        progress
            .set(10 + (((position + 1) * 80) / total) as u8)
            .await?;
    }

    ctx.datastore
        .update_project_status(&project.id, ProjectStatus::Editing)
        .await?;

    logger.log_completion("Narration synthesis finished");
    Ok(())
}
