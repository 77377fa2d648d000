//! The datastore trait.

use async_trait::async_trait;

use deckcast_models::{
    Job, JobId, MediaFile, MediaFileType, Project, ProjectId, ProjectSettings, ProjectStatus,
    Slide, SlideId, SlideStatus,
};

use crate::error::DatastoreResult;

/// Durable relational storage for projects, slides, jobs and media files.
///
/// The trait exposes exactly the mutation and query surface the pipeline
/// core needs; it is injected into the poller and every handler (no
/// process-wide singleton). All mutations are atomic single-row updates.
#[async_trait]
pub trait Datastore: Send + Sync {
    // --- jobs ---

    /// Insert a new job row.
    async fn insert_job(&self, job: Job) -> DatastoreResult<()>;

    /// Fetch a job by ID.
    async fn get_job(&self, id: &JobId) -> DatastoreResult<Option<Job>>;

    /// Pending jobs, oldest-created first, at most `limit` rows.
    async fn pending_jobs(&self, limit: usize) -> DatastoreResult<Vec<Job>>;

    /// Atomically claim a pending job: a conditional `pending → running`
    /// update stamping `started_at`.
    ///
    /// Returns the claimed row, or `None` when the job is no longer pending
    /// (another claimant won, or it was cancelled externally). This is the
    /// claim step; a plain read-then-write would double-process under
    /// concurrent pollers.
    async fn claim_job(&self, id: &JobId) -> DatastoreResult<Option<Job>>;

    /// Write job progress. Clamped to 0-100; writes that would decrease the
    /// value, or that target a job no longer running, are ignored.
    async fn update_job_progress(&self, id: &JobId, progress: u8) -> DatastoreResult<()>;

    /// Transition `running → success`, pin progress to 100 and stamp
    /// `finished_at`.
    async fn complete_job(&self, id: &JobId) -> DatastoreResult<()>;

    /// Transition `running → failed`, record the error message and stamp
    /// `finished_at`.
    async fn fail_job(&self, id: &JobId, error: &str) -> DatastoreResult<()>;

    // --- projects ---

    /// Fetch a project by ID.
    async fn get_project(&self, id: &ProjectId) -> DatastoreResult<Option<Project>>;

    /// Set a project's lifecycle status.
    async fn update_project_status(
        &self,
        id: &ProjectId,
        status: ProjectStatus,
    ) -> DatastoreResult<()>;

    /// Set the derived slide statistics after extraction.
    async fn set_project_slide_stats(
        &self,
        id: &ProjectId,
        slide_count: u32,
        total_estimated_seconds: u32,
    ) -> DatastoreResult<()>;

    /// Fetch a project's settings row.
    async fn project_settings(&self, id: &ProjectId) -> DatastoreResult<Option<ProjectSettings>>;

    // --- slides ---

    /// All slides of a project, ordered by `slide_index`.
    async fn slides_for_project(&self, id: &ProjectId) -> DatastoreResult<Vec<Slide>>;

    /// Insert a batch of slide rows.
    async fn insert_slides(&self, slides: Vec<Slide>) -> DatastoreResult<()>;

    /// Delete every slide of a project. Returns the number of rows removed.
    async fn delete_project_slides(&self, id: &ProjectId) -> DatastoreResult<u64>;

    /// Set a slide's narration stage status.
    async fn update_slide_status(&self, id: &SlideId, status: SlideStatus) -> DatastoreResult<()>;

    /// Record synthesized audio for a slide and mark it `narration_done`.
    async fn set_slide_audio(&self, id: &SlideId, audio_path: &str) -> DatastoreResult<()>;

    // --- media files ---

    /// Insert an artifact record. Rows are never updated, only superseded.
    async fn insert_media_file(&self, file: MediaFile) -> DatastoreResult<()>;

    /// Most recent artifact of a type for a project.
    async fn latest_media_file(
        &self,
        project_id: &ProjectId,
        file_type: MediaFileType,
    ) -> DatastoreResult<Option<MediaFile>>;
}
