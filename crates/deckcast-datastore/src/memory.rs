//! In-process reference backend.
//!
//! Backs the test suite, the worker selfcheck and single-node dev runs.
//! All tables live under one lock so the claim step observes the same
//! atomicity a relational backend provides with a conditional update.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use deckcast_models::{
    Job, JobId, JobStatus, MediaFile, MediaFileType, Project, ProjectId, ProjectSettings,
    ProjectStatus, Slide, SlideId, SlideStatus,
};

use crate::error::{DatastoreError, DatastoreResult};
use crate::store::Datastore;
use async_trait::async_trait;

#[derive(Default)]
struct Tables {
    projects: HashMap<ProjectId, Project>,
    settings: HashMap<ProjectId, ProjectSettings>,
    slides: HashMap<SlideId, Slide>,
    jobs: HashMap<JobId, Job>,
    media_files: Vec<MediaFile>,
}

/// In-memory datastore.
#[derive(Default)]
pub struct MemoryDatastore {
    tables: RwLock<Tables>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project row (test/selfcheck helper, not part of the trait).
    pub fn insert_project(&self, project: Project) {
        let mut t = self.tables.write().unwrap();
        t.projects.insert(project.id.clone(), project);
    }

    /// Seed a settings row.
    pub fn insert_settings(&self, settings: ProjectSettings) {
        let mut t = self.tables.write().unwrap();
        t.settings.insert(settings.project_id.clone(), settings);
    }

    /// Seed a slide row.
    pub fn insert_slide(&self, slide: Slide) {
        let mut t = self.tables.write().unwrap();
        t.slides.insert(slide.id.clone(), slide);
    }

    /// Fetch a slide row (test/selfcheck helper).
    pub fn get_slide(&self, id: &SlideId) -> Option<Slide> {
        self.tables.read().unwrap().slides.get(id).cloned()
    }

    /// All media file rows for a project, oldest first.
    pub fn media_files_for_project(&self, project_id: &ProjectId) -> Vec<MediaFile> {
        self.tables
            .read()
            .unwrap()
            .media_files
            .iter()
            .filter(|m| &m.project_id == project_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn insert_job(&self, job: Job) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        if t.jobs.contains_key(&job.id) {
            return Err(DatastoreError::conflict(format!("job {} exists", job.id)));
        }
        t.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get_job(&self, id: &JobId) -> DatastoreResult<Option<Job>> {
        Ok(self.tables.read().unwrap().jobs.get(id).cloned())
    }

    async fn pending_jobs(&self, limit: usize) -> DatastoreResult<Vec<Job>> {
        let t = self.tables.read().unwrap();
        let mut pending: Vec<Job> = t
            .jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .cloned()
            .collect();
        // FIFO by creation time; id as a stable tiebreak
        pending.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        pending.truncate(limit);
        Ok(pending)
    }

    async fn claim_job(&self, id: &JobId) -> DatastoreResult<Option<Job>> {
        let mut t = self.tables.write().unwrap();
        let job = match t.jobs.get_mut(id) {
            Some(j) => j,
            None => return Ok(None),
        };
        if !job.status.can_transition(JobStatus::Running) {
            return Ok(None);
        }
        *job = job.clone().start();
        Ok(Some(job.clone()))
    }

    async fn update_job_progress(&self, id: &JobId, progress: u8) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        let job = t
            .jobs
            .get_mut(id)
            .ok_or_else(|| DatastoreError::not_found(format!("job {}", id)))?;
        if job.status == JobStatus::Running {
            *job = job.clone().with_progress(progress);
        }
        Ok(())
    }

    async fn complete_job(&self, id: &JobId) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        let job = t
            .jobs
            .get_mut(id)
            .ok_or_else(|| DatastoreError::not_found(format!("job {}", id)))?;
        if !job.status.can_transition(JobStatus::Success) {
            return Err(DatastoreError::InvalidTransition {
                from: job.status,
                to: JobStatus::Success,
            });
        }
        *job = job.clone().complete();
        Ok(())
    }

    async fn fail_job(&self, id: &JobId, error: &str) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        let job = t
            .jobs
            .get_mut(id)
            .ok_or_else(|| DatastoreError::not_found(format!("job {}", id)))?;
        if !job.status.can_transition(JobStatus::Failed) {
            return Err(DatastoreError::InvalidTransition {
                from: job.status,
                to: JobStatus::Failed,
            });
        }
        *job = job.clone().fail(error);
        Ok(())
    }

    async fn get_project(&self, id: &ProjectId) -> DatastoreResult<Option<Project>> {
        Ok(self.tables.read().unwrap().projects.get(id).cloned())
    }

    async fn update_project_status(
        &self,
        id: &ProjectId,
        status: ProjectStatus,
    ) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        let project = t
            .projects
            .get_mut(id)
            .ok_or_else(|| DatastoreError::not_found(format!("project {}", id)))?;
        project.status = status;
        project.updated_at = Utc::now();
        Ok(())
    }

    async fn set_project_slide_stats(
        &self,
        id: &ProjectId,
        slide_count: u32,
        total_estimated_seconds: u32,
    ) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        let project = t
            .projects
            .get_mut(id)
            .ok_or_else(|| DatastoreError::not_found(format!("project {}", id)))?;
        project.slide_count = slide_count;
        project.total_estimated_seconds = total_estimated_seconds;
        project.updated_at = Utc::now();
        Ok(())
    }

    async fn project_settings(&self, id: &ProjectId) -> DatastoreResult<Option<ProjectSettings>> {
        Ok(self.tables.read().unwrap().settings.get(id).cloned())
    }

    async fn slides_for_project(&self, id: &ProjectId) -> DatastoreResult<Vec<Slide>> {
        let t = self.tables.read().unwrap();
        let mut slides: Vec<Slide> = t
            .slides
            .values()
            .filter(|s| &s.project_id == id)
            .cloned()
            .collect();
        slides.sort_by_key(|s| s.slide_index);
        Ok(slides)
    }

    async fn insert_slides(&self, slides: Vec<Slide>) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        for slide in slides {
            t.slides.insert(slide.id.clone(), slide);
        }
        Ok(())
    }

    async fn delete_project_slides(&self, id: &ProjectId) -> DatastoreResult<u64> {
        let mut t = self.tables.write().unwrap();
        let before = t.slides.len();
        t.slides.retain(|_, s| &s.project_id != id);
        Ok((before - t.slides.len()) as u64)
    }

    async fn update_slide_status(&self, id: &SlideId, status: SlideStatus) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        let slide = t
            .slides
            .get_mut(id)
            .ok_or_else(|| DatastoreError::not_found(format!("slide {}", id)))?;
        slide.status = status;
        slide.updated_at = Utc::now();
        Ok(())
    }

    async fn set_slide_audio(&self, id: &SlideId, audio_path: &str) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        let slide = t
            .slides
            .get_mut(id)
            .ok_or_else(|| DatastoreError::not_found(format!("slide {}", id)))?;
        slide.audio_file_path = Some(audio_path.to_string());
        slide.status = SlideStatus::NarrationDone;
        slide.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_media_file(&self, file: MediaFile) -> DatastoreResult<()> {
        let mut t = self.tables.write().unwrap();
        t.media_files.push(file);
        Ok(())
    }

    async fn latest_media_file(
        &self,
        project_id: &ProjectId,
        file_type: MediaFileType,
    ) -> DatastoreResult<Option<MediaFile>> {
        let t = self.tables.read().unwrap();
        Ok(t.media_files
            .iter()
            .filter(|m| &m.project_id == project_id && m.file_type == file_type)
            .max_by_key(|m| m.created_at)
            .cloned())
    }
}
