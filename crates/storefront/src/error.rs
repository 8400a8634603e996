//! Storefront error type.

use gilded_core::ProductId;
use gilded_store::{ConfigError, StoreError};
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The product is not in the current catalog snapshot.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// A lock guarding visitor state was poisoned.
    #[error("Storefront state poisoned")]
    Poisoned,
}
