//! Gilded Storefront library.
//!
//! Everything the public catalog page computes:
//!
//! - [`catalog`] - the live product list, filter/sort queries and facets
//! - [`pricing`] - gold price estimates for a product weight
//! - [`favorites`] - the visitor's favorite products, persisted locally
//! - [`view_state`] - which product panel is open
//! - [`state`] - the shared storefront state tying these together
//!
//! Rendering and routing live outside this crate; every query here is a pure
//! function of the latest catalog snapshot.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod pricing;
pub mod state;
pub mod view_state;

pub use catalog::{
    Catalog, CatalogQuery, CatalogSnapshot, SortOrder, StockFilter, WeightBounds, WeightRange,
};
pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use favorites::{Favorites, FavoritesStorage, FavoritesStore, FileStorage, MemoryStorage};
pub use pricing::{FormattedEstimate, PriceEstimate, PricingDefaults, estimate_price};
pub use state::AppState;
pub use view_state::ViewState;
