//! `PostgreSQL` document store.
//!
//! # Schema
//!
//! - `documents` - one row per document: `(collection, key)` primary key and
//!   a JSONB object body
//!
//! # Change delivery
//!
//! Every write issues `pg_notify('document_changes', <collection>)` in the
//! same transaction as the write, so the notification is sent exactly when
//! the change commits. Each subscribed collection owns a background task
//! holding a `PgListener`; on a matching notification the task reloads the
//! collection and publishes the new snapshot. The listener is registered
//! before the initial load, so a write that commits in between still
//! triggers a reload. Notifications from other processes sharing the
//! database are picked up the same way.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};
use sqlx::postgres::{PgListener, PgPoolOptions};
use sqlx::types::Json;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::document::{Document, DocumentStore, Snapshot, SnapshotEntry, SnapshotReceiver, new_key};
use crate::error::StoreError;

/// Notification channel carrying the name of the changed collection.
pub const NOTIFY_CHANNEL: &str = "document_changes";

/// Document store backed by a `PostgreSQL` JSONB table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    subscriptions: Arc<Mutex<HashMap<String, watch::Sender<Snapshot>>>>,
}

impl PgDocumentStore {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            subscriptions: Arc::default(),
        }
    }

    /// Create a pool with sensible defaults and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        info!("Document store pool created");
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_snapshot(pool: &PgPool, collection: &str) -> Result<Snapshot, StoreError> {
        let rows: Vec<(String, Json<Map<String, Value>>)> = sqlx::query_as(
            r"
            SELECT key, body FROM documents
            WHERE collection = $1
            ORDER BY key
            ",
        )
        .bind(collection)
        .fetch_all(pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (key, Json(body)) in rows {
            match Document::from_map(body) {
                Ok(document) => entries.push(SnapshotEntry { key, document }),
                Err(e) => warn!(collection, key = %key, error = %e, "Skipping malformed document"),
            }
        }
        Ok(Snapshot::new(entries))
    }

    async fn notify(conn: &mut PgConnection, collection: &str) -> Result<(), StoreError> {
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(NOTIFY_CHANNEL)
            .bind(collection)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn connect_listener(pool: &PgPool) -> Result<PgListener, StoreError> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;
        Ok(listener)
    }

    /// Reload `collection` whenever a notification names it.
    async fn listen(
        mut listener: PgListener,
        pool: PgPool,
        collection: String,
        sender: watch::Sender<Snapshot>,
    ) {
        loop {
            match listener.try_recv().await {
                Ok(Some(notification)) if notification.payload() != collection => continue,
                // Some(..) is a change to this collection; None means the
                // connection dropped and notifications may have been missed
                Ok(_) => {}
                Err(e) => {
                    error!(collection = %collection, error = %e, "Change listener failed");
                    return;
                }
            }

            if sender.is_closed() {
                debug!(collection = %collection, "No subscribers left, stopping listener");
                return;
            }

            match Self::load_snapshot(&pool, &collection).await {
                Ok(snapshot) => {
                    sender.send_replace(snapshot);
                }
                Err(e) => error!(collection = %collection, error = %e, "Failed to reload collection"),
            }
        }
    }
}

impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn subscribe(&self, collection: &str) -> Result<SnapshotReceiver, StoreError> {
        {
            let subscriptions = self.subscriptions.lock().map_err(|_| StoreError::Poisoned)?;
            if let Some(sender) = subscriptions.get(collection) {
                if !sender.is_closed() {
                    return Ok(sender.subscribe());
                }
            }
        }

        // LISTEN before loading so nothing committed after the load is missed
        let listener = Self::connect_listener(&self.pool).await?;
        let snapshot = Self::load_snapshot(&self.pool, collection).await?;
        let (sender, receiver) = watch::channel(snapshot);

        let mut subscriptions = self.subscriptions.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(existing) = subscriptions.get(collection) {
            if !existing.is_closed() {
                // Another subscriber raced us; share its listener
                return Ok(existing.subscribe());
            }
        }
        subscriptions.insert(collection.to_string(), sender.clone());
        drop(subscriptions);

        tokio::spawn(Self::listen(
            listener,
            self.pool.clone(),
            collection.to_string(),
            sender,
        ));
        Ok(receiver)
    }

    fn generate_key(&self, _collection: &str) -> String {
        new_key()
    }

    #[instrument(skip(self, document))]
    async fn set(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        let body: Map<String, Value> = document.without_nulls().into();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r"
            INSERT INTO documents (collection, key, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key) DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            ",
        )
        .bind(collection)
        .bind(key)
        .bind(Json(body))
        .execute(&mut *tx)
        .await?;

        Self::notify(&mut tx, collection).await?;
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, collection: &str, key: &str, patch: Document) -> Result<(), StoreError> {
        let patch: Map<String, Value> = patch.into();
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r"
            UPDATE documents
            SET body = jsonb_strip_nulls(body || $3), updated_at = NOW()
            WHERE collection = $1 AND key = $2
            ",
        )
        .bind(collection)
        .bind(key)
        .bind(Json(patch))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{collection}/{key}")));
        }

        Self::notify(&mut tx, collection).await?;
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r"
            DELETE FROM documents
            WHERE collection = $1 AND key = $2
            ",
        )
        .bind(collection)
        .bind(key)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            Self::notify(&mut tx, collection).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
