//! Slide-to-video job pipeline worker.
//!
//! This crate provides:
//! - The periodic poller that claims pending jobs
//! - The three stage handlers (extract structure, synthesize narration,
//!   assemble video)
//! - Capability traits for the pluggable external services
//! - Job progress plumbing and structured per-job logging

pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod poller;
pub mod progress;
pub mod stubs;

#[cfg(test)]
mod pipeline_tests;

pub use capabilities::{
    CapabilityError, NarrationProvider, ParsedSlide, RenderProgress, RenderedVideo, SlideParser,
    VideoRenderer,
};
pub use config::WorkerConfig;
pub use context::PipelineContext;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use poller::Poller;
pub use progress::{JobProgressWriter, RenderBand};
