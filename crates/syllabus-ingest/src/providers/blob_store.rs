//! Blob store for uploaded PDFs

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Trait for original-document storage
///
/// Implementations:
/// - `LocalBlobStore`: Local filesystem
/// - `GcsBlobStore`: Google Cloud Storage (feature `gcp`)
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a name derived from `filename`; returns the blob URL
    async fn upload(&self, data: &[u8], filename: &str) -> Result<String>;

    /// Fetch the bytes behind a URL previously returned by `upload`
    async fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Object name for an upload: unique prefix plus the filename reduced to a safe charset
pub(crate) fn object_name(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let safe: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    let safe = safe.trim_start_matches('.');

    if safe.is_empty() {
        format!("{}-document.pdf", Uuid::new_v4())
    } else {
        format!("{}-{}", Uuid::new_v4(), safe)
    }
}

const FILE_SCHEME: &str = "file://";

/// Local blob store using a filesystem directory
pub struct LocalBlobStore {
    storage_dir: PathBuf,
}

impl LocalBlobStore {
    /// Create the store, creating the directory if needed
    pub fn new(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        std::fs::create_dir_all(&storage_dir)?;
        let storage_dir = std::fs::canonicalize(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    /// Resolve a URL to a path inside the storage directory
    fn resolve(&self, url: &str) -> Result<PathBuf> {
        let path = Path::new(url.strip_prefix(FILE_SCHEME).unwrap_or(url));

        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes || !path.starts_with(&self.storage_dir) {
            return Err(Error::persistence(format!(
                "Blob URL outside local store: {}",
                url
            )));
        }

        Ok(path.to_path_buf())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, data: &[u8], filename: &str) -> Result<String> {
        let path = self.storage_dir.join(object_name(filename));

        tokio::fs::write(&path, data).await.map_err(|e| {
            Error::persistence(format!("Failed to write blob {}: {}", path.display(), e))
        })?;

        tracing::debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(format!("{}{}", FILE_SCHEME, path.display()))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.resolve(url)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::persistence(format!("Failed to read blob {}: {}", url, e)))
    }

    fn name(&self) -> &str {
        "local"
    }
}
