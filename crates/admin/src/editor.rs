//! The product editor: one open form and its submission state.

use gilded_core::{ProductId, ProductListing};
use gilded_store::{BlobStore, DocumentStore};
use tracing::warn;

use crate::error::AdminError;
use crate::form::{FormMode, ProductForm};
use crate::service::ProductAdmin;

/// An open product form.
///
/// A failed submit leaves mode and form exactly as they were, with a
/// message for the operator; nothing is applied speculatively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEditor {
    mode: FormMode,
    form: ProductForm,
    submitting: bool,
    error_message: Option<String>,
}

impl ProductEditor {
    /// A blank form for a new product.
    #[must_use]
    pub fn open_create() -> Self {
        Self {
            mode: FormMode::Create,
            form: ProductForm::default(),
            submitting: false,
            error_message: None,
        }
    }

    /// A form prefilled from a stored product.
    #[must_use]
    pub fn open_edit(listing: &ProductListing) -> Self {
        Self {
            mode: FormMode::edit(listing),
            form: ProductForm::from_product(&listing.product),
            submitting: false,
            error_message: None,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    #[must_use]
    pub const fn form(&self) -> &ProductForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message from the last failed submit, cleared on the next one.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Save the form. On success the editor is done and can be dropped.
    ///
    /// # Errors
    ///
    /// Returns the failure after recording its user message on the editor.
    pub async fn submit<D, B>(&mut self, admin: &ProductAdmin<D, B>) -> Result<ProductId, AdminError>
    where
        D: DocumentStore,
        B: BlobStore,
    {
        self.submitting = true;
        self.error_message = None;

        let result = admin.save(&self.mode, &self.form).await;

        self.submitting = false;
        if let Err(e) = &result {
            if !e.is_validation() {
                warn!(error = %e, "Product form submit failed");
            }
            self.error_message = Some(e.user_message());
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gilded_core::{PRODUCTS_COLLECTION, Product};
    use gilded_store::{MemoryBlobStore, MemoryDocumentStore};

    use super::*;

    fn admin() -> ProductAdmin<MemoryDocumentStore, MemoryBlobStore> {
        ProductAdmin::new(MemoryDocumentStore::new(), MemoryBlobStore::new(), 1024)
    }

    #[tokio::test]
    async fn test_validation_failure_restores_editor() {
        let admin = admin();
        let mut editor = ProductEditor::open_create();
        editor.form_mut().name = "Ring".to_string();
        let before = editor.clone();

        let result = editor.submit(&admin).await;
        assert!(result.is_err());
        assert!(!editor.is_submitting());
        assert_eq!(editor.error_message(), Some("Weight is required"));
        assert_eq!(editor.form(), before.form());
        assert_eq!(editor.mode(), before.mode());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_message() {
        let admin = admin();
        admin.documents().set_unavailable(true);

        let mut editor = ProductEditor::open_create();
        let form = editor.form_mut();
        form.name = "Ring".to_string();
        form.weight = "4g".to_string();
        form.category = "Rings".to_string();

        assert!(editor.submit(&admin).await.is_err());
        assert!(editor.error_message().is_some());

        admin.documents().set_unavailable(false);
        let id = editor.submit(&admin).await.unwrap();
        assert_eq!(editor.error_message(), None);
        assert!(
            admin
                .documents()
                .get(PRODUCTS_COLLECTION, id.as_str())
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_edit_prefills_and_updates() {
        let admin = admin();
        let mut create = ProductEditor::open_create();
        let form = create.form_mut();
        form.name = "Ring".to_string();
        form.weight = "4g".to_string();
        form.category = "Rings".to_string();
        form.image_url = "https://cdn.example/ring.jpg".to_string();
        let id = create.submit(&admin).await.unwrap();

        let doc = admin
            .documents()
            .get(PRODUCTS_COLLECTION, id.as_str())
            .unwrap()
            .unwrap();
        let listing = ProductListing::new(id.clone(), doc.decode::<Product>().unwrap());

        let mut editor = ProductEditor::open_edit(&listing);
        assert!(editor.mode().is_edit());
        assert_eq!(editor.form().name, "Ring");
        editor.form_mut().weight = "4.5g".to_string();
        assert_eq!(editor.submit(&admin).await.unwrap(), id);

        let updated: Product = admin
            .documents()
            .get(PRODUCTS_COLLECTION, id.as_str())
            .unwrap()
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(updated.weight, "4.5g");
        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://cdn.example/ring.jpg")
        );
    }
}
