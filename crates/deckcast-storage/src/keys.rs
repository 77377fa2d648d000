//! Canonical object-key layout for pipeline artifacts.
//!
//! Everything lives under `projects/{project_id}/`. Audio keys are
//! deterministic per slide so regeneration overwrites in place; video keys
//! carry the job id so newer renders supersede older ones without
//! clobbering them.

use deckcast_models::{JobId, ProjectId};

/// Key of the uploaded source deck.
pub fn source_key(project_id: &ProjectId, filename: &str) -> String {
    format!("projects/{}/source/{}", project_id, filename)
}

/// Deterministic key of one slide's narration audio.
pub fn audio_key(project_id: &ProjectId, slide_index: u32) -> String {
    format!("projects/{}/audio/slide_{:03}.mp3", project_id, slide_index)
}

/// Key of a slide's rendered still image.
pub fn slide_image_key(project_id: &ProjectId, slide_index: u32) -> String {
    format!("projects/{}/slides/slide_{:03}.png", project_id, slide_index)
}

/// Key of the video produced by one assembly job.
pub fn video_key(project_id: &ProjectId, job_id: &JobId) -> String {
    format!("projects/{}/video/{}.mp4", project_id, job_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_key_is_deterministic_and_padded() {
        let project_id = ProjectId::from_string("p1");
        assert_eq!(audio_key(&project_id, 7), "projects/p1/audio/slide_007.mp3");
        assert_eq!(audio_key(&project_id, 7), audio_key(&project_id, 7));
        assert_eq!(audio_key(&project_id, 123), "projects/p1/audio/slide_123.mp3");
    }

    #[test]
    fn test_video_key_varies_by_job() {
        let project_id = ProjectId::from_string("p1");
        let a = video_key(&project_id, &JobId::from_string("j1"));
        let b = video_key(&project_id, &JobId::from_string("j2"));
        assert_ne!(a, b);
        assert_eq!(a, "projects/p1/video/j1.mp4");
    }
}
