//! Blob store contract and the filesystem backend.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};
use url::Url;

use crate::error::StoreError;

/// Binary object storage addressed by string keys such as `products/{id}`.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous blob.
    fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// URL clients use to fetch the blob stored under `key`.
    fn retrieval_url(&self, key: &str) -> impl Future<Output = Result<Url, StoreError>> + Send;
}

/// Blobs written to a directory that a web server exposes at `base_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: Url,
}

impl LocalBlobStore {
    /// Create a store rooted at `root`.
    ///
    /// A trailing slash is added to `base_url` so keys join beneath it.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), "Blob written");
        Ok(())
    }

    async fn retrieval_url(&self, key: &str) -> Result<Url, StoreError> {
        let path = self.path_for(key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(self.base_url.join(key)?)
    }
}
