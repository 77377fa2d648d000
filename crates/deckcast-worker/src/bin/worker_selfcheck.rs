//! End-to-end pipeline sanity check over the in-process backends.
//!
//! Seeds a project with a source deck, drives all three stages through the
//! poller and verifies the terminal state. Useful as a deploy smoke test
//! and when swapping in real capability adapters.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};

use deckcast_datastore::{Datastore, MemoryDatastore};
use deckcast_models::{
    Job, JobStatus, JobType, Project, ProjectSettings, ProjectStatus,
};
use deckcast_storage::{keys, BlobStore, MemoryBlobStore};
use deckcast_worker::stubs::{StubNarrationProvider, StubSlideParser, StubVideoRenderer};
use deckcast_worker::{PipelineContext, Poller, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with work_dir={}",
        config.work_dir
    );
    ensure_workdir(&config.work_dir).await?;

    let datastore = Arc::new(MemoryDatastore::new());
    let blobs = Arc::new(MemoryBlobStore::new());

    let project = Project::new("selfcheck", "Selfcheck Deck");
    let source_key = keys::source_key(&project.id, "deck.pptx");
    let project = project.with_source_file(source_key.clone());
    let project_id = project.id.clone();

    datastore.insert_project(project);
    datastore.insert_settings(ProjectSettings::defaults(project_id.clone()));
    blobs
        .upload(
            &source_key,
            b"selfcheck deck bytes".to_vec(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        )
        .await
        .context("seeding source deck")?;

    let ctx = Arc::new(PipelineContext::new(
        datastore.clone(),
        blobs,
        Arc::new(StubSlideParser),
        Arc::new(StubNarrationProvider),
        Arc::new(StubVideoRenderer::new(config.work_dir.clone())),
    ));
    let poller = Poller::new(ctx, config);

    for job_type in [
        JobType::ExtractStructure,
        JobType::SynthesizeNarration,
        JobType::AssembleVideo,
    ] {
        let job = Job::new(project_id.clone(), job_type.clone(), serde_json::Value::Null);
        let job_id = job.id.clone();
        datastore.insert_job(job).await?;

        let processed = poller.tick().await?;
        if processed != 1 {
            bail!("{} tick processed {} jobs, expected 1", job_type, processed);
        }

        let finished = datastore
            .get_job(&job_id)
            .await?
            .context("job row vanished")?;
        if finished.status != JobStatus::Success {
            bail!(
                "{} ended {} ({:?})",
                job_type,
                finished.status,
                finished.error_message
            );
        }
        println!("worker-selfcheck: {} ok", job_type);
    }

    let project = datastore
        .get_project(&project_id)
        .await?
        .context("project row vanished")?;
    if project.status != ProjectStatus::Completed {
        bail!("project ended {}, expected completed", project.status);
    }

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path.as_ref()).await?;
    Ok(())
}
