use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use super::{BlobError, BlobRef, BlobStore};
use async_trait::async_trait;

/// In-memory blob store for unit tests.
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    counter: AtomicU64,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    pub async fn contains(&self, reference: &BlobRef) -> bool {
        self.blobs.read().await.contains_key(reference.as_str())
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<BlobRef, BlobError> {
        let serial = self.counter.fetch_add(1, Ordering::Relaxed);
        let reference = BlobRef::new(format!("mem/{serial}-{original_name}"));
        self.blobs
            .write()
            .await
            .insert(reference.as_str().to_string(), bytes.to_vec());
        Ok(reference)
    }

    async fn delete(&self, reference: &BlobRef) -> Result<(), BlobError> {
        self.blobs
            .write()
            .await
            .remove(reference.as_str())
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(reference.to_string()))
    }
}
