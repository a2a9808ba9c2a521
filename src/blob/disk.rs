use std::path::{Path, PathBuf};

use chrono::Utc;

use super::{BlobError, BlobRef, BlobStore};
use async_trait::async_trait;

/// Filesystem blob store.
///
/// Files land as `<root>/<millis>-<original name>`, the scheme the admin
/// panel frontend already expects in image references. The root directory
/// is created on first write.
pub struct DiskBlobStore {
    root: PathBuf,
}

impl DiskBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn store(&self, bytes: &[u8], original_name: &str) -> Result<BlobRef, BlobError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let file_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            base_name(original_name)
        );
        let path = self.root.join(&file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(BlobRef::new(path.to_string_lossy()))
    }

    async fn delete(&self, reference: &BlobRef) -> Result<(), BlobError> {
        tokio::fs::remove_file(reference.as_str()).await?;
        Ok(())
    }
}

/// Strip any path components a client smuggled into the file name
fn base_name(original: &str) -> String {
    Path::new(original)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string()
}
