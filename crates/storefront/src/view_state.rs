//! Which product panel the visitor has open.
//!
//! At most one panel is open at a time, so the state is a single value
//! rather than a flag per modal.

use gilded_core::ProductId;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "productId", rename_all = "kebab-case")]
pub enum ViewState {
    /// Grid only.
    #[default]
    None,
    /// Full product details.
    Viewing(ProductId),
    /// Compact preview over the grid.
    QuickView(ProductId),
    /// Price calculator for the product.
    Calculating(ProductId),
}

impl ViewState {
    /// The product the open panel belongs to.
    #[must_use]
    pub const fn selected(&self) -> Option<&ProductId> {
        match self {
            Self::None => None,
            Self::Viewing(id) | Self::QuickView(id) | Self::Calculating(id) => Some(id),
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn view(&mut self, id: ProductId) {
        *self = Self::Viewing(id);
    }

    pub fn quick_view(&mut self, id: ProductId) {
        *self = Self::QuickView(id);
    }

    pub fn calculate(&mut self, id: ProductId) {
        *self = Self::Calculating(id);
    }

    pub fn close(&mut self) {
        *self = Self::None;
    }

    /// Close the panel if its product disappeared from the catalog.
    /// Returns whether the state changed.
    pub fn reconcile(&mut self, catalog: &CatalogSnapshot) -> bool {
        let missing = self
            .selected()
            .is_some_and(|id| catalog.get(id).is_none());
        if missing {
            self.close();
        }
        missing
    }
}
