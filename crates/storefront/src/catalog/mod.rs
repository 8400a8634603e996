//! The live product catalog.
//!
//! The storefront subscribes to the `products` collection. Every delivery is
//! a complete snapshot; it is decoded once into a [`CatalogSnapshot`]
//! (listings plus facets) and swapped in whole. Queries run against whatever
//! snapshot is current and never observe a half-applied change.

mod facets;
mod query;

use std::sync::Arc;

use gilded_core::{PRODUCTS_COLLECTION, Product, ProductId, ProductListing};
use gilded_store::{DocumentStore, Snapshot, StoreError, on_snapshot};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

pub use facets::{WeightBounds, available_categories};
pub use query::{CatalogQuery, SortOrder, StockFilter, WeightRange};

use crate::favorites::Favorites;

/// Decoded products and the facets derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    listings: Vec<ProductListing>,
    categories: Vec<String>,
    weight_bounds: WeightBounds,
}

impl CatalogSnapshot {
    /// Build a snapshot from already decoded listings.
    #[must_use]
    pub fn new(listings: Vec<ProductListing>) -> Self {
        let categories = available_categories(&listings);
        let weight_bounds = WeightBounds::from_listings(&listings);
        Self {
            listings,
            categories,
            weight_bounds,
        }
    }

    /// Decode a store snapshot. Documents that are not valid products are
    /// logged and left out.
    #[must_use]
    pub fn decode(snapshot: &Snapshot) -> Self {
        let listings = snapshot
            .entries()
            .iter()
            .filter_map(|entry| match entry.document.decode::<Product>() {
                Ok(product) => Some(ProductListing::new(ProductId::new(&entry.key), product)),
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "Skipping undecodable product document");
                    None
                }
            })
            .collect();
        Self::new(listings)
    }

    /// Every product, in store order.
    #[must_use]
    pub fn listings(&self) -> &[ProductListing] {
        &self.listings
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub const fn weight_bounds(&self) -> WeightBounds {
        self.weight_bounds
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&ProductListing> {
        self.listings.iter().find(|listing| &listing.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Run a query against this snapshot.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery, favorites: &Favorites) -> Vec<&ProductListing> {
        query.apply(&self.listings, favorites)
    }
}

/// Shared handle to the latest catalog snapshot.
///
/// Cheaply cloneable; all clones observe the same snapshot.
#[derive(Clone)]
pub struct Catalog {
    current: Arc<watch::Sender<Arc<CatalogSnapshot>>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(CatalogSnapshot::default()));
        Self {
            current: Arc::new(sender),
        }
    }

    /// Subscribe to the products collection and keep this catalog in sync.
    ///
    /// Returns the catalog together with the task applying snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established.
    #[instrument(skip(store))]
    pub async fn connect<D: DocumentStore>(store: &D) -> Result<(Self, JoinHandle<()>), StoreError> {
        let receiver = store.subscribe(PRODUCTS_COLLECTION).await?;
        let catalog = Self::new();
        let task = catalog.follow(receiver);
        Ok((catalog, task))
    }

    /// Apply every snapshot delivered on `receiver`, starting with the
    /// current one.
    #[must_use]
    pub fn follow(&self, receiver: gilded_store::SnapshotReceiver) -> JoinHandle<()> {
        let catalog = self.clone();
        on_snapshot(receiver, move |snapshot| catalog.replace(CatalogSnapshot::decode(&snapshot)))
    }

    /// Swap in a new snapshot.
    pub fn replace(&self, snapshot: CatalogSnapshot) {
        debug!(products = snapshot.len(), "Catalog snapshot replaced");
        self.current.send_replace(Arc::new(snapshot));
    }

    /// The snapshot queries should run against right now.
    #[must_use]
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.current.borrow())
    }

    /// Receiver that is notified whenever the snapshot is replaced.
    #[must_use]
    pub fn updates(&self) -> watch::Receiver<Arc<CatalogSnapshot>> {
        self.current.subscribe()
    }
}
