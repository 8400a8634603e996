//! Visitor session state shared across the storefront.

use std::sync::{Arc, Mutex};

use gilded_core::{Karat, ProductId, ProductListing};
use gilded_store::DocumentBackend;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::catalog::{Catalog, CatalogQuery};
use crate::config::StorefrontConfig;
use crate::error::StorefrontError;
use crate::favorites::{Favorites, FavoritesStorage, FavoritesStore, FileStorage};
use crate::pricing::{PriceEstimate, estimate_price};
use crate::view_state::ViewState;

/// Storefront state for one visitor.
///
/// Cheaply cloneable via `Arc`. The catalog is shared and kept current by a
/// subscription task; favorites and the open panel belong to the visitor.
pub struct AppState<S> {
    inner: Arc<AppStateInner<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<S> {
    config: StorefrontConfig,
    catalog: Catalog,
    favorites: Mutex<FavoritesStore<S>>,
    view: Mutex<ViewState>,
}

impl AppState<FileStorage> {
    /// Connect to the configured document store and start following the
    /// products collection. Favorites persist under the configured directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or subscribed to.
    #[instrument(skip(config))]
    pub async fn connect(
        config: StorefrontConfig,
    ) -> Result<(Self, JoinHandle<()>), StorefrontError> {
        let store = DocumentBackend::connect(&config.store).await?;
        let (catalog, task) = Catalog::connect(&store).await?;
        let storage = FileStorage::new(&config.favorites_dir);
        info!("Storefront connected");
        Ok((Self::new(config, catalog, storage), task))
    }
}

impl<S: FavoritesStorage> AppState<S> {
    /// Create visitor state over an existing catalog.
    pub fn new(config: StorefrontConfig, catalog: Catalog, storage: S) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                favorites: Mutex::new(FavoritesStore::load(storage)),
                view: Mutex::new(ViewState::default()),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Products matching `query` in the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Poisoned` if the favorites lock is poisoned.
    pub fn browse(&self, query: &CatalogQuery) -> Result<Vec<ProductListing>, StorefrontError> {
        let favorites = self.favorites()?;
        let snapshot = self.inner.catalog.current();
        Ok(snapshot
            .query(query, &favorites)
            .into_iter()
            .cloned()
            .collect())
    }

    /// A copy of the visitor's favorites.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Poisoned` if the favorites lock is poisoned.
    pub fn favorites(&self) -> Result<Favorites, StorefrontError> {
        let store = self
            .inner
            .favorites
            .lock()
            .map_err(|_| StorefrontError::Poisoned)?;
        Ok(store.favorites().clone())
    }

    /// Toggle a product in the favorites. Returns whether it is a favorite
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Poisoned` if the favorites lock is poisoned.
    pub fn toggle_favorite(&self, id: &ProductId) -> Result<bool, StorefrontError> {
        let mut store = self
            .inner
            .favorites
            .lock()
            .map_err(|_| StorefrontError::Poisoned)?;
        Ok(store.toggle(id))
    }

    /// Price a product with the configured presets.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the product is not in the
    /// current snapshot.
    pub fn estimate(&self, id: &ProductId) -> Result<PriceEstimate, StorefrontError> {
        let snapshot = self.inner.catalog.current();
        let listing = snapshot
            .get(id)
            .ok_or_else(|| StorefrontError::NotFound(id.clone()))?;
        Ok(self.inner.config.pricing.estimate(&listing.product))
    }

    /// Price a product with calculator inputs chosen by the visitor.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the product is not in the
    /// current snapshot.
    pub fn estimate_with(
        &self,
        id: &ProductId,
        karat: Karat,
        gold_rate: Decimal,
        making_charge_percent: Decimal,
    ) -> Result<PriceEstimate, StorefrontError> {
        let snapshot = self.inner.catalog.current();
        let listing = snapshot
            .get(id)
            .ok_or_else(|| StorefrontError::NotFound(id.clone()))?;
        Ok(estimate_price(
            &listing.product.weight,
            karat,
            gold_rate,
            making_charge_percent,
        ))
    }

    /// The open panel, closed first if its product has since been deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Poisoned` if the view lock is poisoned.
    pub fn view_state(&self) -> Result<ViewState, StorefrontError> {
        let mut view = self.lock_view()?;
        view.reconcile(&self.inner.catalog.current());
        Ok(view.clone())
    }

    /// Open the details panel for a product.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the product is not in the
    /// current snapshot.
    pub fn view(&self, id: &ProductId) -> Result<(), StorefrontError> {
        self.open(id, ViewState::view)
    }

    /// Open the quick view for a product.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the product is not in the
    /// current snapshot.
    pub fn quick_view(&self, id: &ProductId) -> Result<(), StorefrontError> {
        self.open(id, ViewState::quick_view)
    }

    /// Open the price calculator for a product.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the product is not in the
    /// current snapshot.
    pub fn calculate(&self, id: &ProductId) -> Result<(), StorefrontError> {
        self.open(id, ViewState::calculate)
    }

    /// Close whichever panel is open.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Poisoned` if the view lock is poisoned.
    pub fn close_view(&self) -> Result<(), StorefrontError> {
        self.lock_view()?.close();
        Ok(())
    }

    fn open(
        &self,
        id: &ProductId,
        apply: fn(&mut ViewState, ProductId),
    ) -> Result<(), StorefrontError> {
        if self.inner.catalog.current().get(id).is_none() {
            return Err(StorefrontError::NotFound(id.clone()));
        }
        apply(&mut *self.lock_view()?, id.clone());
        Ok(())
    }

    fn lock_view(&self) -> Result<std::sync::MutexGuard<'_, ViewState>, StorefrontError> {
        self.inner.view.lock().map_err(|_| StorefrontError::Poisoned)
    }
}
