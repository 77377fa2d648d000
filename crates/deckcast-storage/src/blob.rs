//! The blob store trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Content-addressable object storage.
///
/// The pipeline core only ever moves whole objects: the source deck comes
/// down once per extraction, audio and video go up once per synthesis.
/// Streaming is a concern of the capability implementations, not of this
/// seam.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download an object as bytes.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Upload bytes under a key, overwriting any existing object.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Time-limited signed URL for direct client access.
    async fn signed_url(&self, key: &str, ttl: Duration) -> StorageResult<String>;

    /// Whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
