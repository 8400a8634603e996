//! Core types for Gilded.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod weight;

pub use id::*;
pub use price::{Karat, KaratError, parse_amount};
pub use product::{FieldUpdate, PRODUCTS_COLLECTION, Product, ProductListing, ProductPatch};
pub use status::StockStatus;
pub use weight::parse_weight;
