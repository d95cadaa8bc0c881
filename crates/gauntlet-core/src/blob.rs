//! Content-addressed blob fetch for per-test step lists.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("blob backend error: {message}")]
    Backend { message: String },
}

/// Fetches raw bytes from object storage. Each test's step list is stored
/// under its test name.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BlobError>;
}

/// In-memory blob store for tests and local runs.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: impl Into<String>, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.into(), key.into()), bytes.into());
    }

    /// Store a test's step list as its JSON wire form.
    pub fn put_json(&self, bucket: &str, key: &str, body: &serde_json::Value) {
        self.put(bucket, key, serde_json::to_vec(body).unwrap());
    }
}

#[async_trait]
impl BlobFetcher for MemoryBlobStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BlobError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| BlobError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}
