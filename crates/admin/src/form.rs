//! The product form and its validation.
//!
//! The form is a plain record of what the operator typed. Nothing in it is
//! trusted until [`ProductForm::validate`] has produced a
//! [`ValidatedProduct`]; validation never touches the network.

use std::fmt;

use gilded_core::{Product, ProductId, ProductListing};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fields the operator must fill in, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Weight,
    Category,
}

impl RequiredField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Weight, Self::Category];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Weight => "weight",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image file picked by the operator.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    #[must_use]
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Raw product form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    pub weight: String,
    pub category: String,
    pub description: String,
    /// Literal image URL, used when no file is uploaded.
    pub image_url: String,
    pub price: String,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    /// Prefill the form from a stored product. The image URL field starts
    /// empty so that saving without touching it keeps the stored image.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            weight: product.weight.clone(),
            category: product.category.clone(),
            description: product.description.clone().unwrap_or_default(),
            image_url: String::new(),
            price: product.price.clone().unwrap_or_default(),
            image: None,
        }
    }

    /// Check required fields and the image size.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for the first blank required
    /// field, or `ValidationError::ImageTooLarge` if the uploaded file
    /// exceeds `max_image_bytes`.
    pub fn validate(&self, max_image_bytes: usize) -> Result<ValidatedProduct, ValidationError> {
        for field in RequiredField::ALL {
            if self.field(field).trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let image = match (&self.image, non_blank(&self.image_url)) {
            (Some(upload), _) => {
                if upload.bytes.is_empty() {
                    return Err(ValidationError::EmptyImage);
                }
                if upload.bytes.len() > max_image_bytes {
                    return Err(ValidationError::ImageTooLarge {
                        size: upload.bytes.len(),
                        limit: max_image_bytes,
                    });
                }
                ImageSource::Upload(upload.clone())
            }
            (None, Some(url)) => ImageSource::Url(url),
            (None, None) => ImageSource::Unchanged,
        };

        Ok(ValidatedProduct {
            name: self.name.trim().to_string(),
            weight: self.weight.trim().to_string(),
            category: self.category.trim().to_string(),
            description: non_blank(&self.description),
            price: non_blank(&self.price),
            image,
        })
    }

    fn field(&self, field: RequiredField) -> &str {
        match field {
            RequiredField::Name => &self.name,
            RequiredField::Weight => &self.weight,
            RequiredField::Category => &self.category,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Where a saved product's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A new file to upload.
    Upload(ImageUpload),
    /// A URL typed by the operator.
    Url(String),
    /// Nothing supplied: keep the stored image, or none for a new product.
    Unchanged,
}

/// A form that passed validation, with blank optionals turned into `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProduct {
    pub name: String,
    pub weight: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image: ImageSource,
}

/// Whether a form creates a product or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit {
        id: ProductId,
        current_image_url: Option<String>,
    },
}

impl FormMode {
    /// Edit mode for a stored product.
    #[must_use]
    pub fn edit(listing: &ProductListing) -> Self {
        Self::Edit {
            id: listing.id.clone(),
            current_image_url: listing.product.image_url.clone(),
        }
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(self, Self::Edit { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    fn filled() -> ProductForm {
        ProductForm {
            name: "  Temple Necklace ".to_string(),
            weight: "24.5g".to_string(),
            category: "Necklaces".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_required_fields_checked_in_order() {
        let form = ProductForm::default();
        assert_eq!(
            form.validate(LIMIT),
            Err(ValidationError::MissingField(RequiredField::Name))
        );

        let form = ProductForm {
            name: "Ring".to_string(),
            weight: "   ".to_string(),
            ..ProductForm::default()
        };
        assert_eq!(
            form.validate(LIMIT),
            Err(ValidationError::MissingField(RequiredField::Weight))
        );

        let form = ProductForm {
            name: "Ring".to_string(),
            weight: "4g".to_string(),
            ..ProductForm::default()
        };
        assert_eq!(
            form.validate(LIMIT),
            Err(ValidationError::MissingField(RequiredField::Category))
        );
    }

    #[test]
    fn test_trims_and_drops_blank_optionals() {
        let mut form = filled();
        form.description = "   ".to_string();
        form.price = " on request ".to_string();

        let product = form.validate(LIMIT).unwrap();
        assert_eq!(product.name, "Temple Necklace");
        assert_eq!(product.description, None);
        assert_eq!(product.price.as_deref(), Some("on request"));
        assert_eq!(product.image, ImageSource::Unchanged);
    }

    #[test]
    fn test_uploaded_file_wins_over_url() {
        let mut form = filled();
        form.image_url = "https://cdn.example/old.jpg".to_string();
        form.image = Some(ImageUpload::new(vec![1, 2, 3], "image/png"));

        let product = form.validate(LIMIT).unwrap();
        assert!(matches!(product.image, ImageSource::Upload(ref upload) if upload.bytes == [1, 2, 3]));

        form.image = None;
        let product = form.validate(LIMIT).unwrap();
        assert_eq!(
            product.image,
            ImageSource::Url("https://cdn.example/old.jpg".to_string())
        );
    }

    #[test]
    fn test_rejects_oversized_and_empty_images() {
        let mut form = filled();
        form.image = Some(ImageUpload::new(vec![0; LIMIT + 1], "image/jpeg"));
        assert_eq!(
            form.validate(LIMIT),
            Err(ValidationError::ImageTooLarge {
                size: LIMIT + 1,
                limit: LIMIT,
            })
        );

        form.image = Some(ImageUpload::new(Vec::new(), "image/jpeg"));
        assert_eq!(form.validate(LIMIT), Err(ValidationError::EmptyImage));
    }

    #[test]
    fn test_from_product_leaves_image_url_blank() {
        let mut product = Product::new("Ring", "4g", "Rings");
        product.image_url = Some("https://cdn.example/ring.jpg".to_string());
        product.description = Some("Plain band".to_string());

        let form = ProductForm::from_product(&product);
        assert_eq!(form.description, "Plain band");
        assert!(form.image_url.is_empty());
        assert_eq!(form.validate(LIMIT).unwrap().image, ImageSource::Unchanged);
    }

    #[test]
    fn test_edit_mode_carries_current_image() {
        let mut product = Product::new("Ring", "4g", "Rings");
        product.image_url = Some("https://cdn.example/ring.jpg".to_string());
        let listing = ProductListing::new(ProductId::new("p1"), product);

        let mode = FormMode::edit(&listing);
        assert!(mode.is_edit());
        assert_eq!(
            mode,
            FormMode::Edit {
                id: ProductId::new("p1"),
                current_image_url: Some("https://cdn.example/ring.jpg".to_string()),
            }
        );
    }
}
