//! Stub capability implementations.
//!
//! Stand-ins for the real document parser, speech synthesizer and video
//! encoder, wired by the binaries until production adapters exist. They
//! produce placeholder artifacts with realistic shapes so the pipeline can
//! be exercised end to end.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use deckcast_models::{ProjectSettings, Slide};

use crate::capabilities::{
    CapabilityError, NarrationProvider, ParsedSlide, RenderProgress, RenderedVideo, SlideParser,
    VideoRenderer,
};

/// Parser stub returning a fixed five-slide training deck.
#[derive(Debug, Default)]
pub struct StubSlideParser;

#[async_trait]
impl SlideParser for StubSlideParser {
    async fn parse(&self, data: &[u8]) -> Result<Vec<ParsedSlide>, CapabilityError> {
        if data.is_empty() {
            return Err(CapabilityError::unsupported("empty source deck"));
        }

        debug!("Parsing deck ({} bytes)", data.len());

        Ok(vec![
            ParsedSlide {
                title: "Introduction".to_string(),
                text: "Welcome to this training presentation. In this session, we will cover \
                       the basic concepts and important points."
                    .to_string(),
            },
            ParsedSlide {
                title: "Overview".to_string(),
                text: "This slide provides an overview of the topics we will discuss today. \
                       Please pay attention to the key points highlighted."
                    .to_string(),
            },
            ParsedSlide {
                title: "Main Content".to_string(),
                text: "Here is the main content of our training. We will go through each \
                       section step by step to ensure understanding."
                    .to_string(),
            },
            ParsedSlide {
                title: "Summary".to_string(),
                text: "To summarize, we have covered the essential topics. Please review the \
                       materials and feel free to ask questions."
                    .to_string(),
            },
            ParsedSlide {
                title: "Conclusion".to_string(),
                text: "Thank you for attending this training session. We hope you found it \
                       informative and useful for your work."
                    .to_string(),
            },
        ])
    }
}

/// Narration stub producing deterministic placeholder audio bytes.
#[derive(Debug, Default)]
pub struct StubNarrationProvider;

#[async_trait]
impl NarrationProvider for StubNarrationProvider {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
    ) -> Result<Vec<u8>, CapabilityError> {
        debug!(voice, speed, "Synthesizing {} characters", text.chars().count());
        Ok(format!("stub-audio voice={voice} speed={speed} chars={}", text.chars().count())
            .into_bytes())
    }
}

/// Renderer stub writing a placeholder file and reporting per-slide
/// progress; duration is the sum of the slide estimates.
#[derive(Debug)]
pub struct StubVideoRenderer {
    work_dir: PathBuf,
}

impl StubVideoRenderer {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }
}

#[async_trait]
impl VideoRenderer for StubVideoRenderer {
    async fn render(
        &self,
        slides: &[Slide],
        settings: &ProjectSettings,
        progress: &dyn RenderProgress,
    ) -> Result<RenderedVideo, CapabilityError> {
        let total = slides.len();
        let mut duration_seconds = 0.0;

        for (i, slide) in slides.iter().enumerate() {
            progress.update((i * 100 / total.max(1)) as u8).await;
            duration_seconds += slide.estimated_seconds as f64
                + settings.default_pause_ms as f64 / 1000.0;
        }
        progress.update(100).await;

        let mut body = format!(
            "stub-video {} slides {}@{}fps\n",
            total, settings.video_resolution, settings.video_fps
        )
        .into_bytes();
        for slide in slides {
            body.extend_from_slice(
                format!("slide {} audio {:?}\n", slide.slide_index, slide.audio_file_path)
                    .as_bytes(),
            );
        }

        tokio::fs::create_dir_all(&self.work_dir).await?;
        let path = self.work_dir.join(format!("render_{}.mp4", Uuid::new_v4()));
        tokio::fs::write(&path, &body).await?;

        Ok(RenderedVideo {
            path,
            duration_seconds,
            size_bytes: body.len() as u64,
        })
    }
}
