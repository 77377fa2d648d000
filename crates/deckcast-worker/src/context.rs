//! Shared handler context.

use std::sync::Arc;

use deckcast_datastore::Datastore;
use deckcast_storage::BlobStore;

use crate::capabilities::{NarrationProvider, SlideParser, VideoRenderer};

/// Everything a stage handler needs, injected explicitly.
///
/// There is deliberately no process-wide client handle; the poller and
/// every handler reach storage and the external capabilities only through
/// this context.
pub struct PipelineContext {
    /// Durable entity storage
    pub datastore: Arc<dyn Datastore>,
    /// Blob storage for decks, audio and video
    pub blobs: Arc<dyn BlobStore>,
    /// Presentation parsing capability
    pub parser: Arc<dyn SlideParser>,
    /// Speech synthesis capability
    pub narrator: Arc<dyn NarrationProvider>,
    /// Video rendering capability
    pub renderer: Arc<dyn VideoRenderer>,
}

impl PipelineContext {
    pub fn new(
        datastore: Arc<dyn Datastore>,
        blobs: Arc<dyn BlobStore>,
        parser: Arc<dyn SlideParser>,
        narrator: Arc<dyn NarrationProvider>,
        renderer: Arc<dyn VideoRenderer>,
    ) -> Self {
        Self {
            datastore,
            blobs,
            parser,
            narrator,
            renderer,
        }
    }
}
