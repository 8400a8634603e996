//! Runtime selection between store backends.

use tracing::info;
use url::Url;

use crate::blob::{BlobStore, LocalBlobStore};
use crate::config::StoreConfig;
use crate::document::{Document, DocumentStore, SnapshotReceiver};
use crate::error::StoreError;
use crate::memory::{MemoryBlobStore, MemoryDocumentStore};
use crate::postgres::PgDocumentStore;

/// The document store chosen by configuration.
#[derive(Clone)]
pub enum DocumentBackend {
    Memory(MemoryDocumentStore),
    Postgres(PgDocumentStore),
}

impl DocumentBackend {
    /// Connect to the configured document store, running migrations for
    /// `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or migrated.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        match &config.database_url {
            Some(url) => {
                let store = PgDocumentStore::connect(url).await?;
                store.migrate().await?;
                info!("Using PostgreSQL document store");
                Ok(Self::Postgres(store))
            }
            None => {
                info!("Using in-memory document store");
                Ok(Self::Memory(MemoryDocumentStore::new()))
            }
        }
    }
}

impl DocumentStore for DocumentBackend {
    async fn subscribe(&self, collection: &str) -> Result<SnapshotReceiver, StoreError> {
        match self {
            Self::Memory(store) => store.subscribe(collection).await,
            Self::Postgres(store) => store.subscribe(collection).await,
        }
    }

    fn generate_key(&self, collection: &str) -> String {
        match self {
            Self::Memory(store) => store.generate_key(collection),
            Self::Postgres(store) => store.generate_key(collection),
        }
    }

    async fn set(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set(collection, key, document).await,
            Self::Postgres(store) => store.set(collection, key, document).await,
        }
    }

    async fn update(&self, collection: &str, key: &str, patch: Document) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.update(collection, key, patch).await,
            Self::Postgres(store) => store.update(collection, key, patch).await,
        }
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete(collection, key).await,
            Self::Postgres(store) => store.delete(collection, key).await,
        }
    }
}

/// The blob store chosen by configuration.
#[derive(Clone)]
pub enum BlobBackend {
    Memory(MemoryBlobStore),
    Local(LocalBlobStore),
}

impl BlobBackend {
    /// Build the configured blob store.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        match &config.blob_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "Using filesystem blob store");
                Self::Local(LocalBlobStore::new(dir.clone(), config.blob_base_url.clone()))
            }
            None => {
                info!("Using in-memory blob store");
                Self::Memory(MemoryBlobStore::new())
            }
        }
    }
}

impl BlobStore for BlobBackend {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.upload(key, bytes, content_type).await,
            Self::Local(store) => store.upload(key, bytes, content_type).await,
        }
    }

    async fn retrieval_url(&self, key: &str) -> Result<Url, StoreError> {
        match self {
            Self::Memory(store) => store.retrieval_url(key).await,
            Self::Local(store) => store.retrieval_url(key).await,
        }
    }
}
