//! Pluggable external capabilities.
//!
//! The actual document parsing, speech synthesis and video encoding live
//! behind these traits; production implementations are swappable adapters
//! and never hard dependencies of the pipeline core.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use deckcast_models::{ProjectSettings, Slide};

/// Errors raised by a capability implementation.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("{0}")]
    Failed(String),

    #[error("unsupported input: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CapabilityError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

/// One slide as extracted from a source deck.
#[derive(Debug, Clone)]
pub struct ParsedSlide {
    /// Slide title
    pub title: String,
    /// Narrative text
    pub text: String,
}

/// Parses an uploaded presentation into an ordered slide sequence.
#[async_trait]
pub trait SlideParser: Send + Sync {
    async fn parse(&self, data: &[u8]) -> Result<Vec<ParsedSlide>, CapabilityError>;
}

/// Synthesizes narration audio from a script.
#[async_trait]
pub trait NarrationProvider: Send + Sync {
    /// Returns encoded audio bytes for `text` spoken by `voice` at `speed`.
    ///
    /// Must fail with a descriptive error on upstream failure; no retry is
    /// built in.
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
    ) -> Result<Vec<u8>, CapabilityError>;
}

/// Sink for renderer-reported progress, 0-100 and monotone.
#[async_trait]
pub trait RenderProgress: Send + Sync {
    async fn update(&self, percent: u8);
}

/// A rendered video on local disk, ready for upload.
#[derive(Debug, Clone)]
pub struct RenderedVideo {
    /// Local path of the rendered file
    pub path: PathBuf,
    /// Playback length in seconds
    pub duration_seconds: f64,
    /// File size in bytes
    pub size_bytes: u64,
}

/// Renders ordered slide assets into a single video.
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    async fn render(
        &self,
        slides: &[Slide],
        settings: &ProjectSettings,
        progress: &dyn RenderProgress,
    ) -> Result<RenderedVideo, CapabilityError>;
}
