//! Filter and sort configuration for the product grid.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use gilded_core::{ProductListing, StockStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::favorites::Favorites;

/// Which stock states pass the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockFilter {
    #[default]
    All,
    InStock,
    OutOfStock,
}

impl StockFilter {
    #[must_use]
    pub const fn matches(self, status: StockStatus) -> bool {
        match self {
            Self::All => true,
            Self::InStock => matches!(status, StockStatus::InStock),
            Self::OutOfStock => matches!(status, StockStatus::OutOfStock),
        }
    }
}

/// Display order of the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Store order, unchanged.
    #[default]
    Featured,
    WeightAsc,
    WeightDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::WeightAsc => "weight-asc",
            Self::WeightDesc => "weight-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    /// Sort listings in place. Equal keys keep their relative order.
    pub fn sort(self, listings: &mut [&ProductListing]) {
        match self {
            Self::Featured => {}
            Self::WeightAsc => listings.sort_by(|a, b| {
                a.product.weight_or_zero().cmp(&b.product.weight_or_zero())
            }),
            Self::WeightDesc => listings.sort_by(|a, b| {
                b.product.weight_or_zero().cmp(&a.product.weight_or_zero())
            }),
            Self::NameAsc => listings.sort_by(|a, b| compare_names(&a.product.name, &b.product.name)),
            Self::NameDesc => listings.sort_by(|a, b| compare_names(&b.product.name, &a.product.name)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "weight-asc" => Ok(Self::WeightAsc),
            "weight-desc" => Ok(Self::WeightDesc),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Case-insensitive name order, ties broken by the exact string.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Inclusive weight interval in grams.
///
/// Deserialization goes through [`WeightRange::new`], so reversed bounds
/// are swapped there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawWeightRange")]
pub struct WeightRange {
    min: Decimal,
    max: Decimal,
}

#[derive(Deserialize)]
struct RawWeightRange {
    min: Decimal,
    max: Decimal,
}

impl From<RawWeightRange> for WeightRange {
    fn from(raw: RawWeightRange) -> Self {
        Self::new(raw.min, raw.max)
    }
}

impl WeightRange {
    /// Create a range; bounds given in the wrong order are swapped.
    #[must_use]
    pub fn new(min: Decimal, max: Decimal) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    #[must_use]
    pub const fn min(&self) -> Decimal {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Decimal {
        self.max
    }

    #[must_use]
    pub fn contains(&self, weight: Decimal) -> bool {
        self.min <= weight && weight <= self.max
    }
}

/// Everything the visitor has selected in the filter bar.
///
/// Active filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogQuery {
    /// Case-insensitive substring of the name or description.
    pub search: String,
    /// Exact category; `None` or empty matches every category.
    pub category: Option<String>,
    pub stock: StockFilter,
    /// Products whose weight does not parse always pass.
    pub weight_range: Option<WeightRange>,
    pub favorites_only: bool,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Whether a single listing passes every active filter.
    #[must_use]
    pub fn matches(&self, listing: &ProductListing, favorites: &Favorites) -> bool {
        self.matches_search(listing)
            && self.matches_category(listing)
            && self.stock.matches(listing.product.stock_status())
            && self.matches_weight(listing)
            && (!self.favorites_only || favorites.contains(&listing.id))
    }

    /// Filter and order `listings` for display.
    #[must_use]
    pub fn apply<'a>(
        &self,
        listings: &'a [ProductListing],
        favorites: &Favorites,
    ) -> Vec<&'a ProductListing> {
        let mut visible: Vec<&ProductListing> = listings
            .iter()
            .filter(|listing| self.matches(listing, favorites))
            .collect();
        self.sort.sort(&mut visible);
        visible
    }

    fn matches_search(&self, listing: &ProductListing) -> bool {
        // whitespace-only means no search; otherwise match the text as typed
        if self.search.trim().is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        let product = &listing.product;
        product.name.to_lowercase().contains(&needle)
            || product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    fn matches_category(&self, listing: &ProductListing) -> bool {
        match self.category.as_deref() {
            None | Some("") => true,
            Some(category) => listing.product.category == category,
        }
    }

    fn matches_weight(&self, listing: &ProductListing) -> bool {
        let Some(range) = self.weight_range else {
            return true;
        };
        listing
            .product
            .weight_value()
            .is_none_or(|weight| range.contains(weight))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gilded_core::{Product, ProductId};

    use super::*;

    fn listing(id: &str, name: &str, weight: &str, category: &str) -> ProductListing {
        ProductListing::new(ProductId::new(id), Product::new(name, weight, category))
    }

    fn catalog() -> Vec<ProductListing> {
        let mut necklace = listing("p1", "Temple Necklace", "24.5g", "Necklaces");
        necklace.product.description = Some("Hand-carved Lakshmi pendant".to_string());
        let mut ring = listing("p2", "Solitaire Ring", "4g", "Rings");
        ring.product.in_stock = Some(false);
        let mut bangle = listing("p3", "bridal bangle", "30g", "Bangles");
        bangle.product.in_stock = None;
        let charm = listing("p4", "Lucky Charm", "abc", "Charms");
        let studs = listing("p5", "Pearl Studs", "6.2g", "Earrings");
        vec![necklace, ring, bangle, charm, studs]
    }

    fn ids(result: &[&ProductListing]) -> Vec<String> {
        result.iter().map(|l| l.id.to_string()).collect()
    }

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_default_query_keeps_store_order() {
        let products = catalog();
        let result = CatalogQuery::default().apply(&products, &Favorites::default());
        assert_eq!(ids(&result), vec!["p1", "p2", "p3", "p4", "p5"]);
    }

    #[test]
    fn test_search_matches_name_or_description_case_insensitively() {
        let products = catalog();
        let favorites = Favorites::default();

        let query = CatalogQuery {
            search: "RING".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products, &favorites)), vec!["p2"]);

        let query = CatalogQuery {
            search: "lakshmi".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products, &favorites)), vec!["p1"]);
    }

    #[test]
    fn test_blank_search_matches_all() {
        let products = catalog();
        let query = CatalogQuery {
            search: "   ".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(query.apply(&products, &Favorites::default()).len(), 5);
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let products = catalog();
        let favorites = Favorites::default();

        let query = CatalogQuery {
            search: "pearl ".to_string(),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products, &favorites)), vec!["p5"]);

        // "Solitaire Ring" ends in "ring" with no trailing space
        let query = CatalogQuery {
            search: "ring ".to_string(),
            ..CatalogQuery::default()
        };
        assert!(query.apply(&products, &favorites).is_empty());
    }

    #[test]
    fn test_category_is_exact_match() {
        let products = catalog();
        let favorites = Favorites::default();

        let query = CatalogQuery {
            category: Some("Rings".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products, &favorites)), vec!["p2"]);

        let query = CatalogQuery {
            category: Some("rings".to_string()),
            ..CatalogQuery::default()
        };
        assert!(query.apply(&products, &favorites).is_empty());

        let query = CatalogQuery {
            category: Some(String::new()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.apply(&products, &favorites).len(), 5);
    }

    #[test]
    fn test_stock_filter() {
        let products = catalog();
        let favorites = Favorites::default();

        let query = CatalogQuery {
            stock: StockFilter::OutOfStock,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products, &favorites)), vec!["p2"]);

        // absent flag counts as in stock
        let query = CatalogQuery {
            stock: StockFilter::InStock,
            ..CatalogQuery::default()
        };
        assert_eq!(
            ids(&query.apply(&products, &favorites)),
            vec!["p1", "p3", "p4", "p5"]
        );
    }

    #[test]
    fn test_weight_range_is_inclusive_and_skips_unparseable() {
        let products = catalog();
        let query = CatalogQuery {
            weight_range: Some(WeightRange::new(dec(4), dec(24))),
            ..CatalogQuery::default()
        };
        // p1 at 24.5g is outside, p4 "abc" always passes
        assert_eq!(
            ids(&query.apply(&products, &Favorites::default())),
            vec!["p2", "p4", "p5"]
        );
    }

    #[test]
    fn test_favorites_only() {
        let products = catalog();
        let favorites = Favorites::from_ids([ProductId::new("p3"), ProductId::new("p5")]);
        let query = CatalogQuery {
            favorites_only: true,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products, &favorites)), vec!["p3", "p5"]);
    }

    #[test]
    fn test_filters_compose_with_and() {
        let products = catalog();
        let favorites = Favorites::from_ids([ProductId::new("p1"), ProductId::new("p2")]);
        let query = CatalogQuery {
            search: "r".to_string(),
            stock: StockFilter::InStock,
            favorites_only: true,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&query.apply(&products, &favorites)), vec!["p1"]);
    }

    #[test]
    fn test_weight_sort_treats_unparseable_as_zero() {
        let products = catalog();
        let query = CatalogQuery {
            sort: SortOrder::WeightAsc,
            ..CatalogQuery::default()
        };
        assert_eq!(
            ids(&query.apply(&products, &Favorites::default())),
            vec!["p4", "p2", "p5", "p1", "p3"]
        );
    }

    #[test]
    fn test_weight_desc_reverses_asc_for_distinct_weights() {
        let products = catalog();
        let favorites = Favorites::default();
        let asc = CatalogQuery {
            sort: SortOrder::WeightAsc,
            ..CatalogQuery::default()
        };
        let desc = CatalogQuery {
            sort: SortOrder::WeightDesc,
            ..CatalogQuery::default()
        };

        let mut ascending = ids(&asc.apply(&products, &favorites));
        ascending.reverse();
        assert_eq!(ascending, ids(&desc.apply(&products, &favorites)));
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let products = catalog();
        let query = CatalogQuery {
            sort: SortOrder::NameAsc,
            ..CatalogQuery::default()
        };
        assert_eq!(
            ids(&query.apply(&products, &Favorites::default())),
            vec!["p3", "p4", "p5", "p2", "p1"]
        );

        let query = CatalogQuery {
            sort: SortOrder::NameDesc,
            ..CatalogQuery::default()
        };
        assert_eq!(
            ids(&query.apply(&products, &Favorites::default())),
            vec!["p1", "p2", "p5", "p4", "p3"]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let products = vec![
            listing("a", "Ring", "5g", "Rings"),
            listing("b", "Chain", "5g", "Chains"),
            listing("c", "Anklet", "xyz", "Anklets"),
            listing("d", "Stud", "0g", "Earrings"),
        ];
        let favorites = Favorites::default();

        let asc = CatalogQuery {
            sort: SortOrder::WeightAsc,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&asc.apply(&products, &favorites)), vec!["c", "d", "a", "b"]);

        let desc = CatalogQuery {
            sort: SortOrder::WeightDesc,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&desc.apply(&products, &favorites)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let products = catalog();
        let favorites = Favorites::from_ids([ProductId::new("p1"), ProductId::new("p4")]);
        let queries = [
            CatalogQuery::default(),
            CatalogQuery {
                search: "a".to_string(),
                sort: SortOrder::NameDesc,
                ..CatalogQuery::default()
            },
            CatalogQuery {
                weight_range: Some(WeightRange::new(dec(5), dec(25))),
                favorites_only: true,
                sort: SortOrder::WeightDesc,
                ..CatalogQuery::default()
            },
            CatalogQuery {
                stock: StockFilter::OutOfStock,
                category: Some("Rings".to_string()),
                ..CatalogQuery::default()
            },
        ];

        for query in &queries {
            let once: Vec<ProductListing> = query
                .apply(&products, &favorites)
                .into_iter()
                .cloned()
                .collect();
            let twice: Vec<ProductListing> = query
                .apply(&once, &favorites)
                .into_iter()
                .cloned()
                .collect();
            assert_eq!(once, twice, "query {query:?} is not idempotent");
        }
    }

    #[test]
    fn test_sort_order_round_trips_through_str() {
        for order in [
            SortOrder::Featured,
            SortOrder::WeightAsc,
            SortOrder::WeightDesc,
            SortOrder::NameAsc,
            SortOrder::NameDesc,
        ] {
            assert_eq!(order.to_string().parse::<SortOrder>(), Ok(order));
        }
        assert!("price-asc".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_weight_range_swaps_reversed_bounds() {
        let range = WeightRange::new(dec(10), dec(2));
        assert_eq!(range.min(), dec(2));
        assert_eq!(range.max(), dec(10));
        assert!(range.contains(dec(10)));
        assert!(range.contains(dec(2)));
        assert!(!range.contains(dec(11)));
    }

    #[test]
    fn test_deserialized_weight_range_swaps_reversed_bounds() {
        let query: CatalogQuery =
            serde_json::from_str(r#"{"weightRange": {"min": "10", "max": "2"}}"#).unwrap();
        let range = query.weight_range.unwrap();
        assert_eq!(range, WeightRange::new(dec(2), dec(10)));

        let products = catalog();
        let result = query.apply(&products, &Favorites::default());
        // Solitaire Ring (4g), Pearl Studs (6.2g) and the unparseable charm
        assert_eq!(ids(&result), vec!["p2", "p4", "p5"]);
    }

    #[test]
    fn test_query_deserializes_with_defaults() {
        let query: CatalogQuery =
            serde_json::from_str(r#"{"search": "ring", "sort": "weight-desc"}"#).unwrap();
        assert_eq!(query.search, "ring");
        assert_eq!(query.sort, SortOrder::WeightDesc);
        assert_eq!(query.stock, StockFilter::All);
        assert!(!query.favorites_only);
    }
}
