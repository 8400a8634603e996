//! Flat documents, collection snapshots and the document store contract.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::StoreError;

/// A flat mapping of field names to scalar JSON values.
///
/// `null` is accepted so a patch can remove a field; stored documents never
/// keep `null` values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Document(Map<String, Value>);

impl Document {
    /// Wrap a JSON object, rejecting nested arrays and objects.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NestedValue` naming the first nested field.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, StoreError> {
        if let Some((field, _)) = map
            .iter()
            .find(|(_, value)| matches!(value, Value::Array(_) | Value::Object(_)))
        {
            return Err(StoreError::NestedValue(field.clone()));
        }
        Ok(Self(map))
    }

    /// Serialize a record into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not serialize to a flat object.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(map) => Self::from_map(map),
            _ => Err(StoreError::NotAnObject),
        }
    }

    /// Deserialize the document into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    /// Look up a single field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply a partial update: every field in `patch` overwrites the stored
    /// value, `null` removes the field.
    pub fn merge(&mut self, patch: &Self) {
        for (field, value) in &patch.0 {
            if value.is_null() {
                self.0.remove(field);
            } else {
                self.0.insert(field.clone(), value.clone());
            }
        }
    }

    /// Drop `null` fields so the stored document only holds values.
    #[must_use]
    pub fn without_nulls(mut self) -> Self {
        self.0.retain(|_, value| !value.is_null());
        self
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Map<String, Value>> for Document {
    type Error = StoreError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_map(map)
    }
}

impl From<Document> for Map<String, Value> {
    fn from(document: Document) -> Self {
        document.0
    }
}

/// One document in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub key: String,
    pub document: Document,
}

/// A complete, consistent copy of one collection, ordered by key.
///
/// Cloning is cheap; entries are shared.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Arc<[SnapshotEntry]>,
}

impl Snapshot {
    #[must_use]
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find a document by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.document)
    }
}

/// Receiving end of a collection subscription.
///
/// The current snapshot is readable immediately; `changed()` resolves every
/// time the store delivers a new one.
pub type SnapshotReceiver = watch::Receiver<Snapshot>;

/// A document database with live collection subscriptions.
///
/// Implementations re-deliver the complete collection to every subscriber
/// after each write, whether it came from this process or another client.
pub trait DocumentStore: Send + Sync {
    /// Subscribe to a collection.
    fn subscribe(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<SnapshotReceiver, StoreError>> + Send;

    /// Allocate a new, unused document key. Nothing is written.
    fn generate_key(&self, collection: &str) -> String;

    /// Write a full record, replacing any existing document under `key`.
    fn set(
        &self,
        collection: &str,
        key: &str,
        document: Document,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Merge `patch` into an existing document.
    ///
    /// Fails with `StoreError::NotFound` when no document exists under `key`.
    fn update(
        &self,
        collection: &str,
        key: &str,
        patch: Document,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove a document. Removing a missing key succeeds.
    fn delete(
        &self,
        collection: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Invoke `callback` with the current snapshot and again after every change.
///
/// The task ends when the store drops the sending side of the subscription.
pub fn on_snapshot<F>(mut receiver: SnapshotReceiver, mut callback: F) -> JoinHandle<()>
where
    F: FnMut(Snapshot) + Send + 'static,
{
    tokio::spawn(async move {
        let initial = receiver.borrow_and_update().clone();
        callback(initial);

        while receiver.changed().await.is_ok() {
            let snapshot = receiver.borrow_and_update().clone();
            callback(snapshot);
        }

        tracing::debug!("Snapshot subscription closed");
    })
}

/// Generate a time-ordered document key.
pub(crate) fn new_key() -> String {
    uuid::Uuid::now_v7().to_string()
}
