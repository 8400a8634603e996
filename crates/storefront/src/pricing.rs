//! Gold price estimates.
//!
//! ```text
//! base   = weight * gold_rate * (karat / 24)
//! making = base * making_charge_percent / 100
//! total  = base + making
//! ```
//!
//! No rounding is applied to the computed amounts. [`PriceEstimate::formatted`]
//! rounds to two decimals for display only.

use gilded_core::{Karat, Product, parse_weight};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Result of a price calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    /// Parsed weight in grams; zero when the weight did not parse.
    pub weight: Decimal,
    pub karat: Karat,
    pub gold_rate: Decimal,
    pub making_charge_percent: Decimal,
    pub base_price: Decimal,
    pub making_charge_amount: Decimal,
    pub total_price: Decimal,
}

/// Estimate amounts rendered with two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedEstimate {
    pub base_price: String,
    pub making_charge_amount: String,
    pub total_price: String,
}

impl PriceEstimate {
    /// Amounts for display.
    #[must_use]
    pub fn formatted(&self) -> FormattedEstimate {
        FormattedEstimate {
            base_price: format_amount(self.base_price),
            making_charge_amount: format_amount(self.making_charge_amount),
            total_price: format_amount(self.total_price),
        }
    }
}

/// Format an amount with exactly two decimals, rounding half away from zero.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Estimate the price of `weight` grams of gold.
///
/// A weight string without a number yields a zero base price.
#[must_use]
pub fn estimate_price(
    weight: &str,
    karat: Karat,
    gold_rate: Decimal,
    making_charge_percent: Decimal,
) -> PriceEstimate {
    let weight = parse_weight(weight).unwrap_or(Decimal::ZERO);
    let base_price = weight
        .saturating_mul(gold_rate)
        .saturating_mul(karat.fraction());
    let making_charge_amount =
        base_price.saturating_mul(making_charge_percent) / Decimal::ONE_HUNDRED;

    PriceEstimate {
        weight,
        karat,
        gold_rate,
        making_charge_percent,
        base_price,
        making_charge_amount,
        total_price: base_price.saturating_add(making_charge_amount),
    }
}

/// Calculator inputs preset by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDefaults {
    pub karat: Karat,
    /// Price of one gram of pure gold.
    pub gold_rate: Decimal,
    pub making_charge_percent: Decimal,
}

impl PricingDefaults {
    /// Estimate a product's price with these inputs.
    #[must_use]
    pub fn estimate(&self, product: &Product) -> PriceEstimate {
        estimate_price(
            &product.weight,
            self.karat,
            self.gold_rate,
            self.making_charge_percent,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_ten_grams_at_22_karat() {
        let estimate = estimate_price("10g", Karat::new(22).unwrap(), dec(50), dec(10));

        assert_eq!(estimate.weight, dec(10));
        assert_eq!(estimate.base_price.round_dp(2), Decimal::new(45833, 2));
        assert_eq!(estimate.making_charge_amount.round_dp(2), Decimal::new(4583, 2));
        assert_eq!(estimate.total_price.round_dp(2), Decimal::new(50417, 2));

        let formatted = estimate.formatted();
        assert_eq!(formatted.base_price, "458.33");
        assert_eq!(formatted.making_charge_amount, "45.83");
        assert_eq!(formatted.total_price, "504.17");
    }

    #[test]
    fn test_amounts_are_not_rounded_internally() {
        let estimate = estimate_price("10g", Karat::STANDARD, dec(50), dec(0));
        assert_ne!(estimate.base_price, estimate.base_price.round_dp(2));
    }

    #[test]
    fn test_unparseable_weight_prices_at_zero() {
        let estimate = estimate_price("abc", Karat::STANDARD, dec(6000), dec(12));
        assert_eq!(estimate.weight, Decimal::ZERO);
        assert_eq!(estimate.base_price, Decimal::ZERO);
        assert_eq!(estimate.total_price, Decimal::ZERO);
        assert_eq!(estimate.formatted().total_price, "0.00");
    }

    #[test]
    fn test_huge_weight_saturates_instead_of_overflowing() {
        let estimate = estimate_price(
            "99999999999999999999999999999g",
            Karat::new(24).unwrap(),
            dec(6000),
            dec(12),
        );
        assert_eq!(estimate.weight, Decimal::MAX);
        assert_eq!(estimate.base_price, Decimal::MAX);
        assert_eq!(estimate.total_price, Decimal::MAX);
    }

    #[test]
    fn test_pure_gold_without_making_charge() {
        let estimate = estimate_price("2.5g", Karat::new(24).unwrap(), dec(100), dec(0));
        assert_eq!(estimate.base_price, dec(250));
        assert_eq!(estimate.total_price, dec(250));
    }

    #[test]
    fn test_defaults_estimate_product() {
        let defaults = PricingDefaults {
            karat: Karat::new(18).unwrap(),
            gold_rate: dec(80),
            making_charge_percent: dec(5),
        };
        let product = Product::new("Ring", "4g", "Rings");
        let estimate = defaults.estimate(&product);
        // 4 * 80 * 0.75 = 240, plus 5% = 252
        assert_eq!(estimate.base_price, dec(240));
        assert_eq!(estimate.total_price, dec(252));
    }

    #[test]
    fn test_format_amount_pads_and_rounds() {
        assert_eq!(format_amount(dec(7)), "7.00");
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
    }
}
