//! Gilded Core - Shared types library.
//!
//! This crate provides the types shared by every Gilded component:
//! - `store` - Document and blob store contracts
//! - `storefront` - Public catalog browsing, filtering and price estimates
//! - `admin` - Product management against the document store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product documents, identifiers, weight parsing, stock status and purity

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
