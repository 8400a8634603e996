//! Stock status for catalog products.

use serde::{Deserialize, Serialize};

/// Whether a product can currently be ordered.
///
/// Derived from the stored `inStock` flag: only an explicit `false` marks a
/// product out of stock. Documents written before the flag existed have no
/// value and count as in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
}

impl StockStatus {
    /// Classify a stored `inStock` value.
    #[must_use]
    pub const fn from_flag(in_stock: Option<bool>) -> Self {
        match in_stock {
            Some(false) => Self::OutOfStock,
            Some(true) | None => Self::InStock,
        }
    }

    /// The flag to store for this status.
    #[must_use]
    pub const fn as_flag(self) -> bool {
        matches!(self, Self::InStock)
    }

    /// The opposite status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::InStock => Self::OutOfStock,
            Self::OutOfStock => Self::InStock,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "in-stock"),
            Self::OutOfStock => write!(f, "out-of-stock"),
        }
    }
}
