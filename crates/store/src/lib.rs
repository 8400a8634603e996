//! Gilded Store - document and blob storage for the catalog.
//!
//! The catalog talks to two external collaborators:
//!
//! - a **document store** holding flat JSON documents grouped into
//!   collections, with live subscriptions that re-deliver the complete
//!   collection on every change
//! - a **blob store** holding product images under string keys and handing
//!   out retrieval URLs
//!
//! Both are expressed as traits ([`DocumentStore`], [`BlobStore`]) with an
//! in-memory backend for tests and local development, and a persistent
//! backend (`PostgreSQL` documents, filesystem blobs) for deployments.
//!
//! # Consistency
//!
//! Writes are last-write-wins at the field level. There is no optimistic
//! concurrency check: two operators editing the same product will silently
//! overwrite each other's fields.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod blob;
pub mod config;
pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;

pub use backend::{BlobBackend, DocumentBackend};
pub use blob::{BlobStore, LocalBlobStore};
pub use config::{ConfigError, StoreConfig};
pub use document::{
    Document, DocumentStore, Snapshot, SnapshotEntry, SnapshotReceiver, on_snapshot,
};
pub use error::StoreError;
pub use memory::{MemoryBlobStore, MemoryDocumentStore};
pub use postgres::PgDocumentStore;
