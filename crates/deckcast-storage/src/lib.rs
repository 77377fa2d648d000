//! Blob storage for the Deckcast pipeline.
//!
//! This crate provides:
//! - The [`BlobStore`] trait (download / upload / signed URLs)
//! - An S3-compatible client for any S3-API endpoint
//! - An in-memory store for tests and unconfigured dev runs
//! - The canonical object-key layout for pipeline artifacts

pub mod blob;
pub mod client;
pub mod error;
pub mod keys;
pub mod memory;

pub use blob::BlobStore;
pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBlobStore;
