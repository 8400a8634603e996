//! In-process store backends.
//!
//! Used for tests and local development. Both stores can be switched into an
//! unavailable mode to exercise failure handling in callers.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, instrument};
use url::Url;

use crate::blob::BlobStore;
use crate::document::{Document, DocumentStore, Snapshot, SnapshotEntry, SnapshotReceiver, new_key};
use crate::error::StoreError;

const MEMORY_BLOB_BASE_URL: &str = "memory://blobs/";

struct Collection {
    documents: BTreeMap<String, Document>,
    sender: watch::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            documents: BTreeMap::new(),
            sender,
        }
    }

    fn publish(&self) {
        let entries = self
            .documents
            .iter()
            .map(|(key, document)| SnapshotEntry {
                key: key.clone(),
                document: document.clone(),
            })
            .collect();
        self.sender.send_replace(Snapshot::new(entries));
    }
}

/// Document store kept in process memory.
///
/// Cheaply cloneable; clones share the same collections, so a clone handed
/// to the admin and one handed to the storefront behave like two clients of
/// one remote database.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, Collection>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Read a single document directly.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the store lock was poisoned.
    pub fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(collections
            .get(collection)
            .and_then(|c| c.documents.get(key))
            .cloned())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }

    fn with_collection<T>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut Collection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut collections = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        f(entry)
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn subscribe(&self, collection: &str) -> Result<SnapshotReceiver, StoreError> {
        self.with_collection(collection, |c| Ok(c.sender.subscribe()))
    }

    fn generate_key(&self, _collection: &str) -> String {
        new_key()
    }

    #[instrument(skip(self, document))]
    async fn set(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        self.check_available()?;
        self.with_collection(collection, |c| {
            c.documents.insert(key.to_string(), document.without_nulls());
            c.publish();
            Ok(())
        })?;
        debug!("Document written");
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, collection: &str, key: &str, patch: Document) -> Result<(), StoreError> {
        self.check_available()?;
        self.with_collection(collection, |c| {
            let document = c
                .documents
                .get_mut(key)
                .ok_or_else(|| StoreError::NotFound(format!("{collection}/{key}")))?;
            document.merge(&patch);
            c.publish();
            Ok(())
        })?;
        debug!("Document updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.with_collection(collection, |c| {
            if c.documents.remove(key).is_some() {
                c.publish();
            }
            Ok(())
        })?;
        debug!("Document deleted");
        Ok(())
    }
}

/// An uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store kept in process memory. URLs use the `memory://` scheme.
#[derive(Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, StoredBlob>>>,
    base_url: Url,
    unavailable: Arc<AtomicBool>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    /// Create an empty blob store.
    ///
    /// # Panics
    ///
    /// Never; the base URL is a valid constant.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            blobs: Arc::default(),
            base_url: Url::parse(MEMORY_BLOB_BASE_URL).expect("constant base url parses"),
            unavailable: Arc::default(),
        }
    }

    /// Make every subsequent operation fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Read back an uploaded blob.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the store lock was poisoned.
    pub fn get(&self, key: &str) -> Result<Option<StoredBlob>, StoreError> {
        let blobs = self.blobs.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(blobs.get(key).cloned())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory blob store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl BlobStore for MemoryBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut blobs = self.blobs.lock().map_err(|_| StoreError::Poisoned)?;
        blobs.insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn retrieval_url(&self, key: &str) -> Result<Url, StoreError> {
        self.check_available()?;
        let exists = self
            .blobs
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .contains_key(key);
        if !exists {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(self.base_url.join(key)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_subscriber_sees_full_collection_after_each_write() {
        let store = MemoryDocumentStore::new();
        let mut rx = store.subscribe("products").await.unwrap();
        assert!(rx.borrow().is_empty());

        store
            .set("products", "a", doc(json!({"name": "Ring"})))
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(rx.borrow_and_update().len(), 1);

        store
            .set("products", "b", doc(json!({"name": "Chain"})))
            .await
            .unwrap();
        let snapshot = rx.borrow_and_update().clone();
        let keys: Vec<_> = snapshot.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let writer = MemoryDocumentStore::new();
        let reader = writer.clone();
        let rx = reader.subscribe("products").await.unwrap();

        writer
            .set("products", "a", doc(json!({"name": "Ring"})))
            .await
            .unwrap();

        assert_eq!(rx.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryDocumentStore::new();
        store
            .set("products", "a", doc(json!({"name": "Ring", "description": "Plain"})))
            .await
            .unwrap();

        let result = store
            .update("products", "a", doc(json!({"inStock": false, "description": null})))
            .await;
        assert!(result.is_ok());

        let stored = store.get("products", "a").ok().flatten().unwrap();
        assert_eq!(stored.get("name"), Some(&json!("Ring")));
        assert_eq!(stored.get("inStock"), Some(&json!(false)));
        assert_eq!(stored.get("description"), None);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let result = store
            .update("products", "missing", doc(json!({"inStock": false})))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryDocumentStore::new();
        let rx = store.subscribe("products").await.unwrap();
        assert!(store.delete("products", "missing").await.is_ok());
        assert!(!rx.has_changed().unwrap_or(true));
    }

    #[tokio::test]
    async fn test_set_strips_nulls() {
        let store = MemoryDocumentStore::new();
        store
            .set("products", "a", doc(json!({"name": "Ring", "price": null})))
            .await
            .unwrap();
        let stored = store.get("products", "a").ok().flatten().unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_rejects_writes() {
        let store = MemoryDocumentStore::new();
        store.set_unavailable(true);
        let result = store.set("products", "a", doc(json!({"name": "Ring"}))).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.get("products", "a").ok().flatten().is_none());
    }

    #[tokio::test]
    async fn test_blob_upload_and_url() {
        let blobs = MemoryBlobStore::new();
        blobs
            .upload("products/a", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        let url = blobs.retrieval_url("products/a").await.ok();
        assert_eq!(url.map(String::from), Some("memory://blobs/products/a".to_string()));

        let stored = blobs.get("products/a").ok().flatten();
        assert_eq!(stored.map(|b| b.content_type), Some("image/png".to_string()));
    }

    #[tokio::test]
    async fn test_blob_url_for_missing_key() {
        let blobs = MemoryBlobStore::new();
        let result = blobs.retrieval_url("products/none").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
