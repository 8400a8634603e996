//! Gilded Admin library.
//!
//! Product administration for the catalog: the product form, its
//! validation, and the create/edit/delete/stock operations against the
//! document and blob stores.
//!
//! # Consistency
//!
//! Writes are last-write-wins at the field level. Two operators editing the
//! same product overwrite each other without warning.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod service;

pub use config::AdminConfig;
pub use editor::ProductEditor;
pub use error::{AdminError, ValidationError};
pub use form::{FormMode, ImageSource, ImageUpload, ProductForm, RequiredField, ValidatedProduct};
pub use service::{Confirmation, ProductAdmin, image_key};
