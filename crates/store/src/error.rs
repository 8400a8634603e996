//! Errors returned by store backends.

use thiserror::Error;

/// Errors that can occur during document or blob store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Filesystem error from a blob backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be converted to or from a document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document field holds an array or object.
    #[error("field `{0}` holds a nested value; documents must be flat")]
    NestedValue(String),

    /// A record did not serialize to a JSON object.
    #[error("record does not serialize to an object")]
    NotAnObject,

    /// Requested document or blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Blob key is empty or escapes the storage root.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Retrieval URL could not be built.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Backend refused the operation (network, permission).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("store state poisoned")]
    Poisoned,
}
