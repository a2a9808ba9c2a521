pub mod disk;
pub mod memory;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use disk::DiskBlobStore;
pub use memory::MemoryBlobStore;

/// Rejection message for uploads that fail the image filter
pub const UPLOAD_REJECTION: &str = "Only images are allowed (jpeg, jpg, png).";

const ALLOWED_IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png"];

/// Errors from blob storage backends
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blob not found: {0}")]
    NotFound(String),
}

/// Binary payload lifted off a multipart request
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Opaque reference to a stored blob, persisted on the owning document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage boundary for uploaded images
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<BlobRef, BlobError>;

    async fn delete(&self, reference: &BlobRef) -> Result<(), BlobError>;
}

/// Both the file extension and the declared content type must name an
/// allowed image format before any bytes are stored.
pub fn is_allowed_image(file_name: &str, content_type: &str) -> bool {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    ALLOWED_IMAGE_TYPES.contains(&extension.as_str())
        && ALLOWED_IMAGE_TYPES
            .iter()
            .any(|allowed| content_type.contains(allowed))
}

/// A stored blob that is discarded again unless `keep` is called.
///
/// Create/update handlers hold one of these across the store call; every
/// failure exit drops the guard and the orphaned upload is deleted without
/// per-branch cleanup code. Deletion is best-effort: failures are logged,
/// never surfaced.
pub struct StoredBlob {
    store: Arc<dyn BlobStore>,
    reference: BlobRef,
    kept: bool,
}

impl StoredBlob {
    /// Store the payload and take ownership of its cleanup
    pub async fn create(
        store: Arc<dyn BlobStore>,
        image: &UploadedImage,
    ) -> Result<Self, BlobError> {
        let reference = store.store(&image.bytes, &image.original_name).await?;
        Ok(Self { store, reference, kept: false })
    }

    pub fn reference(&self) -> &BlobRef {
        &self.reference
    }

    /// The owning document was persisted; the blob outlives this guard
    pub fn keep(mut self) -> BlobRef {
        self.kept = true;
        self.reference.clone()
    }
}

impl Drop for StoredBlob {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        let store = self.store.clone();
        let reference = self.reference.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = store.delete(&reference).await {
                    tracing::warn!("Failed to discard orphaned upload {}: {}", reference, err);
                }
            });
        }
    }
}
