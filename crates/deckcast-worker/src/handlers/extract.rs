//! Structure extraction handler.
//!
//! Downloads the uploaded deck, parses it into slide rows and seeds the
//! narration scripts. A failure here leaves the project untouched: no slide
//! is committed before the parse succeeds, so the prior state remains
//! authoritative.

use deckcast_models::{ExtractStructurePayload, Job, ProjectStatus, Slide};

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::progress::JobProgressWriter;

pub async fn extract_structure(
    ctx: &PipelineContext,
    job: &Job,
    payload: &ExtractStructurePayload,
) -> WorkerResult<()> {
    let logger = JobLogger::new(&job.id, "extract_structure");
    let progress = JobProgressWriter::new(ctx.datastore.clone(), job.id.clone());

    let project = ctx
        .datastore
        .get_project(&job.project_id)
        .await?
        .ok_or_else(|| WorkerError::ProjectNotFound(job.project_id.clone()))?;

    let source_key = project
        .source_file_path
        .clone()
        .ok_or_else(|| WorkerError::MissingSourceFile(project.id.clone()))?;

    logger.log_start(&format!("Extracting structure from {}", source_key));
    progress.set(10).await?;

    let deck = ctx.blobs.download(&source_key).await?;
    progress.set(30).await?;

    let parsed = ctx
        .parser
        .parse(&deck)
        .await
        .map_err(WorkerError::Extraction)?;
    logger.log_progress(&format!("Parsed {} slide(s)", parsed.len()));
    progress.set(70).await?;

    if payload.reparse {
        let removed = ctx.datastore.delete_project_slides(&project.id).await?;
        if removed > 0 {
            logger.log_progress(&format!("Dropped {} existing slide(s) for reparse", removed));
        }
    }

    let slides: Vec<Slide> = parsed
        .into_iter()
        .enumerate()
        .map(|(i, s)| Slide::from_extracted(project.id.clone(), (i + 1) as u32, s.title, s.text))
        .collect();

    let slide_count = slides.len() as u32;
    let total_estimated_seconds: u32 = slides.iter().map(|s| s.estimated_seconds).sum();

    ctx.datastore.insert_slides(slides).await?;
    progress.set(90).await?;

    ctx.datastore
        .set_project_slide_stats(&project.id, slide_count, total_estimated_seconds)
        .await?;
    ctx.datastore
        .update_project_status(&project.id, ProjectStatus::Editing)
        .await?;

    logger.log_completion(&format!(
        "{} slide(s), ~{}s of narration",
        slide_count, total_estimated_seconds
    ));
    Ok(())
}
