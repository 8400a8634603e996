//! Gold purity and informational price amounts.
//!
//! Prices stored on a product are display strings ("₹45,000", "on request").
//! They are never trusted as numbers; [`parse_amount`] extracts a value when
//! one is present and otherwise yields `None`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::weight::parse_weight;

/// Number of karats in pure gold.
pub const PURE_GOLD_KARATS: u8 = 24;

/// Errors from constructing a [`Karat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KaratError {
    #[error("karat must be between 1 and 24 (got {0})")]
    OutOfRange(u8),
    #[error("invalid karat value: {0}")]
    Invalid(String),
}

/// Gold purity expressed in karats (parts of gold per 24).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Karat(u8);

impl Karat {
    /// 22 karat, the shop's standard purity.
    pub const STANDARD: Self = Self(22);

    /// Create a purity value.
    ///
    /// # Errors
    ///
    /// Returns `KaratError::OutOfRange` unless `1 <= karats <= 24`.
    pub const fn new(karats: u8) -> Result<Self, KaratError> {
        if karats == 0 || karats > PURE_GOLD_KARATS {
            return Err(KaratError::OutOfRange(karats));
        }
        Ok(Self(karats))
    }

    /// The raw karat count.
    #[must_use]
    pub const fn karats(self) -> u8 {
        self.0
    }

    /// Fraction of pure gold, `karats / 24`.
    #[must_use]
    pub fn fraction(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(PURE_GOLD_KARATS)
    }
}

impl Default for Karat {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for Karat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

impl TryFrom<u8> for Karat {
    type Error = KaratError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Karat> for u8 {
    fn from(value: Karat) -> Self {
        value.0
    }
}

impl FromStr for Karat {
    type Err = KaratError;

    /// Accepts "22", "22K" or "22k".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches(['k', 'K']);
        let karats = digits
            .parse::<u8>()
            .map_err(|_| KaratError::Invalid(s.to_string()))?;
        Self::new(karats)
    }
}

/// Extract a numeric amount from an informational price string.
///
/// Thousands separators and currency symbols are ignored. Returns `None`
/// when the string contains no digits.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    parse_weight(raw)
}
