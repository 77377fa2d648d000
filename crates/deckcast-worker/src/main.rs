//! Deckcast pipeline worker binary.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deckcast_datastore::MemoryDatastore;
use deckcast_storage::{BlobStore, MemoryBlobStore, S3Client, S3Config};
use deckcast_worker::stubs::{StubNarrationProvider, StubSlideParser, StubVideoRenderer};
use deckcast_worker::{PipelineContext, Poller, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("deckcast=info".parse().unwrap())
        .add_directive("aws_config=warn".parse().unwrap())
        .add_directive("aws_sdk_s3=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting deckcast-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let blobs: Arc<dyn BlobStore> = match S3Config::from_env() {
        Ok(s3_config) => Arc::new(S3Client::new(s3_config)),
        Err(e) => {
            warn!("Blob storage not configured ({}), using in-memory store", e);
            Arc::new(MemoryBlobStore::new())
        }
    };

    // In-process datastore; a durable backend implements the same trait and
    // slots in here.
    let datastore = Arc::new(MemoryDatastore::new());

    let ctx = Arc::new(PipelineContext::new(
        datastore,
        blobs,
        Arc::new(StubSlideParser),
        Arc::new(StubNarrationProvider),
        Arc::new(StubVideoRenderer::new(config.work_dir.clone())),
    ));

    let poller = Arc::new(Poller::new(ctx, config));

    // Setup signal handler
    let signal_poller = Arc::clone(&poller);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        signal_poller.shutdown();
    });

    poller.run().await;

    info!("Worker shutdown complete");
}
