//! End-to-end pipeline tests over the in-memory backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use deckcast_datastore::{Datastore, MemoryDatastore};
use deckcast_models::{
    narration_seconds, Job, JobStatus, JobType, MediaFileType, Project, ProjectId,
    ProjectSettings, ProjectStatus, Slide, SlideStatus,
};
use deckcast_storage::{keys, BlobStore, MemoryBlobStore};

use crate::capabilities::{
    CapabilityError, NarrationProvider, RenderProgress, RenderedVideo, VideoRenderer,
};
use crate::config::WorkerConfig;
use crate::context::PipelineContext;
use crate::poller::Poller;
use crate::stubs::{StubSlideParser, StubVideoRenderer};

/// Narrator that records every invocation and can fail on the nth call.
struct RecordingNarrator {
    invocations: Mutex<Vec<(String, f32)>>,
    fail_on_call: Option<usize>,
}

impl RecordingNarrator {
    fn new() -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            fail_on_call: None,
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
        }
    }

    fn calls(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    fn voices(&self) -> Vec<(String, f32)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrationProvider for RecordingNarrator {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
    ) -> Result<Vec<u8>, CapabilityError> {
        let call = {
            let mut invocations = self.invocations.lock().unwrap();
            invocations.push((voice.to_string(), speed));
            invocations.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(CapabilityError::failed("synthesizer unavailable"));
        }
        Ok(format!("audio:{}", text.chars().count()).into_bytes())
    }
}

/// Renderer that counts invocations around the stub implementation.
struct CountingRenderer {
    calls: AtomicUsize,
    inner: StubVideoRenderer,
}

impl CountingRenderer {
    fn new(work_dir: &std::path::Path) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            inner: StubVideoRenderer::new(work_dir),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRenderer for CountingRenderer {
    async fn render(
        &self,
        slides: &[Slide],
        settings: &ProjectSettings,
        progress: &dyn RenderProgress,
    ) -> Result<RenderedVideo, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.render(slides, settings, progress).await
    }
}

struct Harness {
    datastore: Arc<MemoryDatastore>,
    blobs: Arc<MemoryBlobStore>,
    narrator: Arc<RecordingNarrator>,
    renderer: Arc<CountingRenderer>,
    poller: Poller,
    _work_dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with_narrator(RecordingNarrator::new())
    }

    fn with_narrator(narrator: RecordingNarrator) -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let datastore = Arc::new(MemoryDatastore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let narrator = Arc::new(narrator);
        let renderer = Arc::new(CountingRenderer::new(work_dir.path()));

        let ctx = Arc::new(PipelineContext::new(
            datastore.clone(),
            blobs.clone(),
            Arc::new(StubSlideParser),
            narrator.clone(),
            renderer.clone(),
        ));
        let poller = Poller::new(ctx, WorkerConfig::default());

        Self {
            datastore,
            blobs,
            narrator,
            renderer,
            poller,
            _work_dir: work_dir,
        }
    }

    /// Seed a project with settings and, optionally, an uploaded deck.
    async fn seed_project(&self, with_source: bool) -> Project {
        let mut project = Project::new("tester", "Test Deck");
        if with_source {
            let source_key = keys::source_key(&project.id, "deck.pptx");
            self.blobs
                .upload(&source_key, b"deck-bytes".to_vec(), "application/octet-stream")
                .await
                .unwrap();
            project = project.with_source_file(source_key);
        }
        self.datastore.insert_project(project.clone());
        self.datastore
            .insert_settings(ProjectSettings::defaults(project.id.clone()));
        project
    }

    /// Seed `count` draft slides with scripts; optionally with audio already
    /// attached.
    fn seed_slides(&self, project_id: &ProjectId, count: usize, with_audio: bool) -> Vec<Slide> {
        let mut slides = Vec::new();
        for i in 1..=count {
            let mut slide = Slide::from_extracted(
                project_id.clone(),
                i as u32,
                format!("Slide {i}"),
                format!("Narration script for slide number {i}."),
            );
            if with_audio {
                slide.audio_file_path = Some(format!("existing/slide_{i}.mp3"));
                slide.status = SlideStatus::NarrationDone;
            }
            self.datastore.insert_slide(slide.clone());
            slides.push(slide);
        }
        slides
    }

    /// Enqueue a job, run one poll tick and return the finished row.
    async fn run_job(
        &self,
        project_id: &ProjectId,
        job_type: JobType,
        payload: serde_json::Value,
    ) -> Job {
        let job = Job::new(project_id.clone(), job_type, payload);
        let job_id = job.id.clone();
        self.datastore.insert_job(job).await.unwrap();

        let processed = self.poller.tick().await.unwrap();
        assert_eq!(processed, 1, "tick should process exactly the enqueued job");

        self.datastore.get_job(&job_id).await.unwrap().unwrap()
    }

    async fn project(&self, id: &ProjectId) -> Project {
        self.datastore.get_project(id).await.unwrap().unwrap()
    }

    async fn slides(&self, id: &ProjectId) -> Vec<Slide> {
        self.datastore.slides_for_project(id).await.unwrap()
    }
}

#[tokio::test]
async fn extract_structure_populates_slides_and_project() {
    let h = Harness::new();
    let project = h.seed_project(true).await;

    let job = h
        .run_job(&project.id, JobType::ExtractStructure, serde_json::Value::Null)
        .await;

    assert_eq!(job.status, JobStatus::Success);
    assert_eq!(job.progress, 100);
    assert!(job.finished_at.is_some());

    let slides = h.slides(&project.id).await;
    assert_eq!(slides.len(), 5);
    for (i, slide) in slides.iter().enumerate() {
        assert_eq!(slide.slide_index, (i + 1) as u32);
        assert_eq!(slide.original_text, slide.generated_script);
        assert_eq!(slide.estimated_seconds, narration_seconds(slide.char_count));
        assert_eq!(slide.status, SlideStatus::Draft);
    }

    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Editing);
    assert_eq!(project.slide_count, 5);
    assert_eq!(
        project.total_estimated_seconds,
        slides.iter().map(|s| s.estimated_seconds).sum::<u32>()
    );
}

#[tokio::test]
async fn extract_without_source_fails_and_leaves_project_alone() {
    let h = Harness::new();
    let project = h.seed_project(false).await;

    let job = h
        .run_job(&project.id, JobType::ExtractStructure, serde_json::Value::Null)
        .await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .contains("no source file uploaded"));
    assert!(job.progress < 100);

    // Extraction failures never regress the project
    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Draft);
    assert!(h.slides(&project.id).await.is_empty());
}

#[tokio::test]
async fn reparse_true_replaces_existing_slides() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    h.seed_slides(&project.id, 2, false);

    let job = h
        .run_job(
            &project.id,
            JobType::ExtractStructure,
            serde_json::json!({ "reparse": true }),
        )
        .await;

    assert_eq!(job.status, JobStatus::Success);

    // Exactly the newly parsed set, no leftovers and no duplicates
    let slides = h.slides(&project.id).await;
    assert_eq!(slides.len(), 5);
    let indexes: Vec<_> = slides.iter().map(|s| s.slide_index).collect();
    assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn reparse_false_on_populated_project_duplicates_rows() {
    let h = Harness::new();
    let project = h.seed_project(true).await;

    h.run_job(&project.id, JobType::ExtractStructure, serde_json::Value::Null)
        .await;
    let job = h
        .run_job(
            &project.id,
            JobType::ExtractStructure,
            serde_json::json!({ "reparse": false }),
        )
        .await;

    assert_eq!(job.status, JobStatus::Success);

    // Insert, not upsert: a second pass without reparse doubles the rows.
    // Documented source behavior, not something callers should rely on.
    let slides = h.slides(&project.id).await;
    assert_eq!(slides.len(), 10);
    let project = h.project(&project.id).await;
    assert_eq!(project.slide_count, 5);
}

#[tokio::test]
async fn narration_synthesizes_all_slides_end_to_end() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    h.seed_slides(&project.id, 3, false);

    let job = h
        .run_job(
            &project.id,
            JobType::SynthesizeNarration,
            serde_json::json!({ "slide_ids": [] }),
        )
        .await;

    assert_eq!(job.status, JobStatus::Success);
    assert_eq!(job.progress, 100);

    let slides = h.slides(&project.id).await;
    assert_eq!(slides.len(), 3);
    for slide in &slides {
        let audio_key = slide.audio_file_path.as_deref().unwrap();
        assert_eq!(audio_key, keys::audio_key(&project.id, slide.slide_index));
        assert_eq!(slide.status, SlideStatus::NarrationDone);
        assert!(h.blobs.exists(audio_key).await.unwrap());
    }
    assert_eq!(h.narrator.calls(), 3);

    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Editing);

    // One audio artifact row per slide
    let audio_rows = h
        .datastore
        .media_files_for_project(&project.id)
        .into_iter()
        .filter(|m| m.file_type == MediaFileType::Audio)
        .count();
    assert_eq!(audio_rows, 3);
}

#[tokio::test]
async fn narration_skips_slides_with_audio_unless_regenerating() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    let slides = h.seed_slides(&project.id, 3, false);

    // Give the middle slide pre-existing audio
    h.datastore
        .set_slide_audio(&slides[1].id, "existing/slide_2.mp3")
        .await
        .unwrap();

    let job = h
        .run_job(&project.id, JobType::SynthesizeNarration, serde_json::json!({}))
        .await;

    assert_eq!(job.status, JobStatus::Success);
    // The provider never saw the already-narrated slide
    assert_eq!(h.narrator.calls(), 2);

    let slides = h.slides(&project.id).await;
    assert_eq!(
        slides[1].audio_file_path.as_deref(),
        Some("existing/slide_2.mp3")
    );

    // With regenerate, everything is re-synthesized in place
    let job = h
        .run_job(
            &project.id,
            JobType::SynthesizeNarration,
            serde_json::json!({ "regenerate": true }),
        )
        .await;
    assert_eq!(job.status, JobStatus::Success);
    assert_eq!(h.narrator.calls(), 5);
    let slides = h.slides(&project.id).await;
    assert_eq!(
        slides[1].audio_file_path.as_deref(),
        Some(keys::audio_key(&project.id, 2).as_str())
    );
}

#[tokio::test]
async fn narration_respects_slide_subset_and_overrides() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    let mut slides = h.seed_slides(&project.id, 3, false);

    slides[2].voice_override = Some("nova".to_string());
    slides[2].speed_override = Some(1.5);
    h.datastore.insert_slide(slides[2].clone());

    let job = h
        .run_job(
            &project.id,
            JobType::SynthesizeNarration,
            serde_json::json!({ "slide_ids": [slides[2].id] }),
        )
        .await;

    assert_eq!(job.status, JobStatus::Success);
    assert_eq!(h.narrator.voices(), vec![("nova".to_string(), 1.5)]);

    let stored = h.slides(&project.id).await;
    assert!(stored[2].has_audio());
    assert!(!stored[0].has_audio());
    assert!(!stored[1].has_audio());
}

#[tokio::test]
async fn narration_failure_marks_project_failed_but_keeps_finished_audio() {
    let h = Harness::with_narrator(RecordingNarrator::failing_on(1));
    let project = h.seed_project(true).await;
    h.seed_slides(&project.id, 3, false);

    let job = h
        .run_job(&project.id, JobType::SynthesizeNarration, serde_json::json!({}))
        .await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .contains("narration synthesis failed"));
    // Setup 10% plus one of three slides completed
    assert_eq!(job.progress, 36);

    let slides = h.slides(&project.id).await;
    assert!(slides[0].has_audio());
    assert_eq!(slides[0].status, SlideStatus::NarrationDone);
    assert!(!slides[1].has_audio());
    assert_eq!(slides[1].status, SlideStatus::NarrationFailed);
    assert_eq!(slides[2].status, SlideStatus::Draft);

    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Failed);
}

#[tokio::test]
async fn narration_with_no_candidates_is_a_precondition_failure() {
    let h = Harness::new();
    let project = h.seed_project(true).await;

    let job = h
        .run_job(&project.id, JobType::SynthesizeNarration, serde_json::json!({}))
        .await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("no slides to process"));
    assert_eq!(h.narrator.calls(), 0);
}

#[tokio::test]
async fn assemble_rejects_incomplete_narration_without_rendering() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    let slides = h.seed_slides(&project.id, 3, true);

    // Strip audio from two slides
    for slide in &slides[1..] {
        let mut stripped = slide.clone();
        stripped.audio_file_path = None;
        stripped.status = SlideStatus::Draft;
        h.datastore.insert_slide(stripped);
    }

    let job = h
        .run_job(&project.id, JobType::AssembleVideo, serde_json::json!({}))
        .await;

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(
        job.error_message.as_deref(),
        Some("2 slide(s) do not have narration audio")
    );
    assert!(job.progress < 100);
    assert_eq!(h.renderer.calls(), 0);

    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Failed);
}

#[tokio::test]
async fn assemble_renders_uploads_and_completes_project() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    h.seed_slides(&project.id, 3, true);

    let job = h
        .run_job(&project.id, JobType::AssembleVideo, serde_json::json!({}))
        .await;

    assert_eq!(job.status, JobStatus::Success);
    assert_eq!(job.progress, 100);
    assert_eq!(h.renderer.calls(), 1);

    let video_key = keys::video_key(&project.id, &job.id);
    assert!(h.blobs.exists(&video_key).await.unwrap());

    let media = h
        .datastore
        .latest_media_file(&project.id, MediaFileType::Video)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(media.path, video_key);
    assert!(media.duration_sec.unwrap() > 0.0);
    assert!(media.size_bytes.unwrap() > 0);

    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn unknown_job_type_fails_without_touching_entities() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    h.seed_slides(&project.id, 1, false);

    let job = h
        .run_job(
            &project.id,
            JobType::Unknown("thumbnail_sweep".to_string()),
            serde_json::Value::Null,
        )
        .await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .contains("thumbnail_sweep"));

    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Draft);
    let slides = h.slides(&project.id).await;
    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].status, SlideStatus::Draft);
}

#[tokio::test]
async fn malformed_payload_fails_the_job() {
    let h = Harness::new();
    let project = h.seed_project(true).await;
    h.seed_slides(&project.id, 1, false);

    let job = h
        .run_job(
            &project.id,
            JobType::SynthesizeNarration,
            serde_json::json!({ "slide_ids": "not-a-list" }),
        )
        .await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .contains("invalid job payload"));
    assert_eq!(h.narrator.calls(), 0);
}

#[tokio::test]
async fn tick_skips_jobs_claimed_elsewhere() {
    let h = Harness::new();
    let project = h.seed_project(true).await;

    let job = Job::new(
        project.id.clone(),
        JobType::ExtractStructure,
        serde_json::Value::Null,
    );
    let job_id = job.id.clone();
    h.datastore.insert_job(job).await.unwrap();

    // Another poller wins the claim first
    h.datastore.claim_job(&job_id).await.unwrap().unwrap();

    assert_eq!(h.poller.tick().await.unwrap(), 0);
    let job = h.datastore.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Running);
}

#[tokio::test]
async fn hung_capability_fails_the_job_on_timeout() {
    /// Narrator that never returns, standing in for a stuck upstream call.
    struct HangingNarrator;

    #[async_trait]
    impl NarrationProvider for HangingNarrator {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: &str,
            _speed: f32,
        ) -> Result<Vec<u8>, CapabilityError> {
            std::future::pending().await
        }
    }

    let work_dir = tempfile::tempdir().unwrap();
    let datastore = Arc::new(MemoryDatastore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let ctx = Arc::new(PipelineContext::new(
        datastore.clone(),
        blobs,
        Arc::new(StubSlideParser),
        Arc::new(HangingNarrator),
        Arc::new(CountingRenderer::new(work_dir.path())),
    ));
    let config = WorkerConfig {
        job_timeout: std::time::Duration::from_millis(50),
        ..WorkerConfig::default()
    };
    let poller = Poller::new(ctx, config);

    let project = Project::new("tester", "Hung Deck");
    let project_id = project.id.clone();
    datastore.insert_project(project);
    datastore.insert_settings(ProjectSettings::defaults(project_id.clone()));
    datastore.insert_slide(Slide::from_extracted(
        project_id.clone(),
        1,
        "Only",
        "some script text",
    ));

    let job = Job::new(
        project_id,
        JobType::SynthesizeNarration,
        serde_json::Value::Null,
    );
    let job_id = job.id.clone();
    datastore.insert_job(job).await.unwrap();

    assert_eq!(poller.tick().await.unwrap(), 1);

    let job = datastore.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.as_deref().unwrap().contains("timed out"));
}

#[tokio::test]
async fn full_pipeline_runs_to_completed_project() {
    let h = Harness::new();
    let project = h.seed_project(true).await;

    let extract = h
        .run_job(&project.id, JobType::ExtractStructure, serde_json::Value::Null)
        .await;
    assert_eq!(extract.status, JobStatus::Success);

    let narrate = h
        .run_job(&project.id, JobType::SynthesizeNarration, serde_json::Value::Null)
        .await;
    assert_eq!(narrate.status, JobStatus::Success);

    let assemble = h
        .run_job(&project.id, JobType::AssembleVideo, serde_json::Value::Null)
        .await;
    assert_eq!(assemble.status, JobStatus::Success);

    let project = h.project(&project.id).await;
    assert_eq!(project.status, ProjectStatus::Completed);
    assert_eq!(project.slide_count, 5);

    for slide in h.slides(&project.id).await {
        assert!(slide.has_audio());
        assert_eq!(slide.estimated_seconds, narration_seconds(slide.char_count));
    }

    assert!(h
        .datastore
        .latest_media_file(&project.id, MediaFileType::Video)
        .await
        .unwrap()
        .is_some());
}
