//! In-memory blob store for tests and unconfigured dev runs.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::blob::BlobStore;
use crate::error::{StorageError, StorageResult};

#[derive(Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// Blob store backed by a process-local map.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects (test helper).
    pub fn len(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for a key (test helper).
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .unwrap()
            .get(key)
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .unwrap()
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.objects.write().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        if !self.objects.read().unwrap().contains_key(key) {
            return Err(StorageError::not_found(key));
        }
        Ok(format!("memory://{}?expires_in={}", key, ttl.as_secs()))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_download_roundtrip() {
        let store = MemoryBlobStore::new();
        store
            .upload("projects/p/audio/slide_001.mp3", b"audio".to_vec(), "audio/mpeg")
            .await
            .unwrap();

        let data = store.download("projects/p/audio/slide_001.mp3").await.unwrap();
        assert_eq!(data, b"audio");
        assert_eq!(
            store.content_type("projects/p/audio/slide_001.mp3").as_deref(),
            Some("audio/mpeg")
        );
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.download("nope").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_signed_url_requires_object() {
        let store = MemoryBlobStore::new();
        store.upload("k", vec![1], "application/octet-stream").await.unwrap();

        let url = store.signed_url("k", Duration::from_secs(600)).await.unwrap();
        assert!(url.starts_with("memory://k"));
        assert!(store.signed_url("missing", Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryBlobStore::new();
        store.upload("k", vec![1], "application/octet-stream").await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(!store.exists("k").await.unwrap());
    }
}
