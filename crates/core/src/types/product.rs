//! Product documents as stored in the `products` collection.
//!
//! A stored product is a flat mapping of scalar fields. `weight` and `price`
//! are display strings typed by the shop and are only ever parsed
//! defensively (see [`parse_weight`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::id::ProductId;
use super::price::parse_amount;
use super::status::StockStatus;
use super::weight::parse_weight;

/// Name of the document collection holding products.
pub const PRODUCTS_COLLECTION: &str = "products";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    /// Magnitude plus unit, e.g. "10g".
    pub weight: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    /// Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl Product {
    /// Create an in-stock product with the required fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        weight: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            weight: weight.into(),
            category: category.into(),
            description: None,
            image_url: None,
            in_stock: Some(true),
            price: None,
        }
    }

    /// Stock status derived from the stored flag.
    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::from_flag(self.in_stock)
    }

    /// Parsed weight, or `None` when the weight string has no number in it.
    #[must_use]
    pub fn weight_value(&self) -> Option<Decimal> {
        parse_weight(&self.weight)
    }

    /// Parsed weight with unparseable values treated as zero.
    #[must_use]
    pub fn weight_or_zero(&self) -> Decimal {
        self.weight_value().unwrap_or(Decimal::ZERO)
    }

    /// Parsed informational price, if any.
    #[must_use]
    pub fn price_value(&self) -> Option<Decimal> {
        self.price.as_deref().and_then(parse_amount)
    }
}

/// A product together with the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    pub id: ProductId,
    #[serde(flatten)]
    pub product: Product,
}

impl ProductListing {
    #[must_use]
    pub const fn new(id: ProductId, product: Product) -> Self {
        Self { id, product }
    }
}

/// How a partial update treats one field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Overwrite the stored value.
    Set(T),
    /// Remove the field from the document.
    Clear,
}

impl<T> FieldUpdate<T> {
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl FieldUpdate<String> {
    /// `Set` for non-blank text, `Clear` for blank text.
    #[must_use]
    pub fn from_text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Clear
        } else {
            Self::Set(trimmed.to_string())
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            // Keep is skipped by the containing struct
            Self::Keep | Self::Clear => serializer.serialize_none(),
        }
    }
}

/// A partial product update. Serializes to a flat object containing only the
/// touched fields; cleared fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub name: FieldUpdate<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub weight: FieldUpdate<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub category: FieldUpdate<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub description: FieldUpdate<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub image_url: FieldUpdate<String>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub in_stock: FieldUpdate<bool>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub price: FieldUpdate<String>,
}

impl ProductPatch {
    /// A patch that only sets the stock flag.
    #[must_use]
    pub fn stock(status: StockStatus) -> Self {
        Self {
            in_stock: FieldUpdate::Set(status.as_flag()),
            ..Self::default()
        }
    }

    /// Whether the patch touches no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.weight.is_keep()
            && self.category.is_keep()
            && self.description.is_keep()
            && self.image_url.is_keep()
            && self.in_stock.is_keep()
            && self.price.is_keep()
    }
}
