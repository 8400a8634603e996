//! Product write operations.
//!
//! Every operation validates first and only then talks to the stores. An
//! image upload and its URL lookup complete before the document write that
//! references the URL, so a failed upload never leaves a product pointing
//! at a missing image.

use gilded_core::{
    FieldUpdate, PRODUCTS_COLLECTION, Product, ProductId, ProductListing, ProductPatch,
    StockStatus,
};
use gilded_store::{BlobBackend, BlobStore, Document, DocumentBackend, DocumentStore};
use tracing::{error, info, instrument};

use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::form::{FormMode, ImageSource, ImageUpload, ProductForm, ValidatedProduct};

/// Operator's answer to the delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Blob key for a product's image.
#[must_use]
pub fn image_key(id: &ProductId) -> String {
    format!("{PRODUCTS_COLLECTION}/{id}")
}

/// Product administration over a document store and a blob store.
#[derive(Debug, Clone)]
pub struct ProductAdmin<D, B> {
    documents: D,
    blobs: B,
    max_image_bytes: usize,
}

impl ProductAdmin<DocumentBackend, BlobBackend> {
    /// Build the admin over the configured backends.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Store` if the document store cannot be reached.
    #[instrument(skip(config))]
    pub async fn connect(config: &AdminConfig) -> Result<Self, AdminError> {
        let documents = DocumentBackend::connect(&config.store)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to connect document store");
                AdminError::Store(e)
            })?;
        let blobs = BlobBackend::from_config(&config.store);
        Ok(Self::new(documents, blobs, config.max_image_bytes))
    }
}

impl<D: DocumentStore, B: BlobStore> ProductAdmin<D, B> {
    #[must_use]
    pub const fn new(documents: D, blobs: B, max_image_bytes: usize) -> Self {
        Self {
            documents,
            blobs,
            max_image_bytes,
        }
    }

    #[must_use]
    pub const fn documents(&self) -> &D {
        &self.documents
    }

    #[must_use]
    pub const fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Create a product under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` without touching either store if the
    /// form is invalid, otherwise any store or upload failure.
    #[instrument(skip(self, form), fields(product.name = %form.name))]
    pub async fn create(&self, form: &ProductForm) -> Result<ProductId, AdminError> {
        let validated = form.validate(self.max_image_bytes)?;
        let id = ProductId::new(self.documents.generate_key(PRODUCTS_COLLECTION));

        let image_url = self.resolve_image(&id, &validated.image).await?;
        let product = Product {
            name: validated.name,
            weight: validated.weight,
            category: validated.category,
            description: validated.description,
            image_url,
            in_stock: Some(StockStatus::InStock.as_flag()),
            price: validated.price,
        };

        let document = Document::from_record(&product).map_err(AdminError::Store)?;
        self.documents
            .set(PRODUCTS_COLLECTION, id.as_str(), document)
            .await
            .map_err(|e| store_failure(&id, "create", e))?;

        info!(product.id = %id, "Product created");
        Ok(id)
    }

    /// Update the editable fields of an existing product.
    ///
    /// The stored image is kept unless the form supplies a new file or URL.
    /// Returns the image URL the product has afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` without touching either store if the
    /// form is invalid, `AdminError::Store` with `StoreError::NotFound` if
    /// the product was deleted meanwhile, otherwise any store or upload
    /// failure.
    #[instrument(skip(self, id, current_image_url, form), fields(product.id = %id))]
    pub async fn update(
        &self,
        id: &ProductId,
        current_image_url: Option<&str>,
        form: &ProductForm,
    ) -> Result<Option<String>, AdminError> {
        let validated = form.validate(self.max_image_bytes)?;
        let new_image_url = self.resolve_image(id, &validated.image).await?;

        let patch = edit_patch(validated, new_image_url.clone());
        let document = Document::from_record(&patch).map_err(AdminError::Store)?;
        self.documents
            .update(PRODUCTS_COLLECTION, id.as_str(), document)
            .await
            .map_err(|e| store_failure(id, "update", e))?;

        info!(image_replaced = new_image_url.is_some(), "Product updated");
        Ok(new_image_url.or_else(|| current_image_url.map(str::to_string)))
    }

    /// Create or update depending on how the form was opened.
    ///
    /// # Errors
    ///
    /// See [`Self::create`] and [`Self::update`].
    pub async fn save(&self, mode: &FormMode, form: &ProductForm) -> Result<ProductId, AdminError> {
        match mode {
            FormMode::Create => self.create(form).await,
            FormMode::Edit {
                id,
                current_image_url,
            } => {
                self.update(id, current_image_url.as_deref(), form).await?;
                Ok(id.clone())
            }
        }
    }

    /// Delete a product once the operator has confirmed.
    ///
    /// Returns whether a delete was issued. Deleting an id that no longer
    /// exists succeeds. The product's image blob is left in place.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Store` if the delete fails.
    #[instrument(skip(self, id), fields(product.id = %id))]
    pub async fn delete(
        &self,
        id: &ProductId,
        confirmation: Confirmation,
    ) -> Result<bool, AdminError> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }
        self.documents
            .delete(PRODUCTS_COLLECTION, id.as_str())
            .await
            .map_err(|e| store_failure(id, "delete", e))?;
        info!("Product deleted");
        Ok(true)
    }

    /// Flip a product between in stock and out of stock, leaving every
    /// other field alone. Returns the new status.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Store` if the update fails.
    #[instrument(skip(self, listing), fields(product.id = %listing.id))]
    pub async fn toggle_stock(&self, listing: &ProductListing) -> Result<StockStatus, AdminError> {
        let status = listing.product.stock_status().toggled();
        let document =
            Document::from_record(&ProductPatch::stock(status)).map_err(AdminError::Store)?;
        self.documents
            .update(PRODUCTS_COLLECTION, listing.id.as_str(), document)
            .await
            .map_err(|e| store_failure(&listing.id, "toggle stock", e))?;
        info!(%status, "Stock status changed");
        Ok(status)
    }

    /// Apply the image precedence: uploaded file, then literal URL, then
    /// nothing.
    async fn resolve_image(
        &self,
        id: &ProductId,
        source: &ImageSource,
    ) -> Result<Option<String>, AdminError> {
        match source {
            ImageSource::Upload(upload) => self.upload_image(id, upload).await.map(Some),
            ImageSource::Url(url) => Ok(Some(url.clone())),
            ImageSource::Unchanged => Ok(None),
        }
    }

    async fn upload_image(&self, id: &ProductId, upload: &ImageUpload) -> Result<String, AdminError> {
        let key = image_key(id);
        self.blobs
            .upload(&key, upload.bytes.clone(), &upload.content_type)
            .await
            .map_err(|e| blob_failure(&key, e))?;
        let url = self
            .blobs
            .retrieval_url(&key)
            .await
            .map_err(|e| blob_failure(&key, e))?;
        Ok(url.to_string())
    }
}

/// Patch for an edit: required fields always, optional fields set or
/// cleared, the image only when a new one was resolved.
fn edit_patch(validated: ValidatedProduct, new_image_url: Option<String>) -> ProductPatch {
    ProductPatch {
        name: FieldUpdate::Set(validated.name),
        weight: FieldUpdate::Set(validated.weight),
        category: FieldUpdate::Set(validated.category),
        description: validated
            .description
            .map_or(FieldUpdate::Clear, FieldUpdate::Set),
        image_url: new_image_url.map_or(FieldUpdate::Keep, FieldUpdate::Set),
        in_stock: FieldUpdate::Keep,
        price: validated.price.map_or(FieldUpdate::Clear, FieldUpdate::Set),
    }
}

fn store_failure(id: &ProductId, operation: &str, e: gilded_store::StoreError) -> AdminError {
    error!(product.id = %id, operation, error = %e, "Product write failed");
    AdminError::Store(e)
}

fn blob_failure(key: &str, e: gilded_store::StoreError) -> AdminError {
    error!(key, error = %e, "Image upload failed");
    AdminError::Blob(e)
}
