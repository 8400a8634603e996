//! Error types for admin operations.

use gilded_store::StoreError;
use thiserror::Error;

use crate::form::RequiredField;

/// Problems with form input, raised before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(RequiredField),
    #[error("image is {size} bytes, the limit is {limit}")]
    ImageTooLarge { size: usize, limit: usize },
    #[error("image file is empty")]
    EmptyImage,
}

/// Application-level error type for product administration.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The form was rejected before anything was written.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Image upload or URL resolution failed.
    #[error("Blob error: {0}")]
    Blob(StoreError),
}

impl AdminError {
    /// Message shown to the operator.
    ///
    /// Validation problems are shown verbatim; backend details stay in the
    /// logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => capitalize(&e.to_string()),
            Self::Store(StoreError::NotFound(_)) => {
                "This product no longer exists.".to_string()
            }
            Self::Store(_) => "Could not save the product. Please try again.".to_string(),
            Self::Blob(_) => "Could not upload the image. Please try again.".to_string(),
        }
    }

    /// Whether the failure happened before any I/O.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
