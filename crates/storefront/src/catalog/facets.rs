//! Filter bar facets derived from the full, unfiltered catalog.

use std::collections::BTreeSet;

use gilded_core::ProductListing;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::query::WeightRange;

const DEFAULT_MIN_WEIGHT: i64 = 0;
const DEFAULT_MAX_WEIGHT: i64 = 1000;

/// Distinct category values, sorted.
#[must_use]
pub fn available_categories(listings: &[ProductListing]) -> Vec<String> {
    listings
        .iter()
        .map(|listing| listing.product.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Limits of the weight slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            min: Decimal::from(DEFAULT_MIN_WEIGHT),
            max: Decimal::from(DEFAULT_MAX_WEIGHT),
        }
    }
}

impl WeightBounds {
    /// Floor of the lightest and ceiling of the heaviest parseable weight.
    ///
    /// Falls back to `[0, 1000]` when no weight parses.
    #[must_use]
    pub fn from_listings(listings: &[ProductListing]) -> Self {
        let mut weights = listings
            .iter()
            .filter_map(|listing| listing.product.weight_value());

        let Some(first) = weights.next() else {
            return Self::default();
        };
        let (min, max) = weights.fold((first, first), |(min, max), weight| {
            (min.min(weight), max.max(weight))
        });

        Self {
            min: min.floor(),
            max: max.ceil(),
        }
    }

    /// A range covering the whole slider.
    #[must_use]
    pub fn full_range(self) -> WeightRange {
        WeightRange::new(self.min, self.max)
    }
}
