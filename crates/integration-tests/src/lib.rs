//! Integration tests for Gilded.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests
//! cargo test -p gilded-integration-tests
//!
//! # PostgreSQL tests
//! GILDED_TEST_DATABASE_URL=postgres://localhost/gilded_test \
//!     cargo test -p gilded-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_sync` - admin writes observed through the storefront catalog
//! - `admin_workflow` - editor and admin behaviour across both stores
//! - `postgres_store` - the `PostgreSQL` document backend

use std::sync::Once;
use std::time::Duration;

use gilded_admin::{ProductAdmin, ProductForm};
use gilded_store::{MemoryBlobStore, MemoryDocumentStore};
use gilded_storefront::{Catalog, CatalogSnapshot};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// How long a test waits for a snapshot to propagate.
pub const PROPAGATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Upload limit used by test admins.
pub const TEST_MAX_IMAGE_BYTES: usize = 64 * 1024;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// An admin and a storefront catalog sharing in-memory stores.
pub struct TestContext {
    pub documents: MemoryDocumentStore,
    pub blobs: MemoryBlobStore,
    pub admin: ProductAdmin<MemoryDocumentStore, MemoryBlobStore>,
    pub catalog: Catalog,
    pub sync_task: JoinHandle<()>,
}

impl TestContext {
    /// Build the context and start following the products collection.
    ///
    /// # Panics
    ///
    /// If the in-memory subscription fails.
    #[allow(clippy::unwrap_used)]
    pub async fn new() -> Self {
        init_tracing();
        let documents = MemoryDocumentStore::new();
        let blobs = MemoryBlobStore::new();
        let admin = ProductAdmin::new(documents.clone(), blobs.clone(), TEST_MAX_IMAGE_BYTES);
        let (catalog, sync_task) = Catalog::connect(&documents).await.unwrap();
        Self {
            documents,
            blobs,
            admin,
            catalog,
            sync_task,
        }
    }

    /// Wait until the catalog satisfies `predicate`.
    ///
    /// # Panics
    ///
    /// If the condition is not met within [`PROPAGATION_TIMEOUT`].
    #[allow(clippy::expect_used)]
    pub async fn wait_for<F>(&self, predicate: F)
    where
        F: FnMut(&std::sync::Arc<CatalogSnapshot>) -> bool,
    {
        let mut updates = self.catalog.updates();
        tokio::time::timeout(PROPAGATION_TIMEOUT, updates.wait_for(predicate))
            .await
            .expect("catalog did not update in time")
            .expect("catalog sender dropped");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.sync_task.abort();
    }
}

/// A form with every required field filled.
#[must_use]
pub fn product_form(name: &str, weight: &str, category: &str) -> ProductForm {
    ProductForm {
        name: name.to_string(),
        weight: weight.to_string(),
        category: category.to_string(),
        ..ProductForm::default()
    }
}
