//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GILDED_GOLD_RATE` - Price of one gram of pure gold (default: 0)
//! - `GILDED_DEFAULT_KARAT` - Karat preset in the price calculator (default: 22)
//! - `GILDED_MAKING_CHARGE_PERCENT` - Making charge preset (default: 0)
//! - `GILDED_FAVORITES_DIR` - Directory for the visitor's favorites
//!   (default: `.gilded`)
//!
//! Store variables are documented on [`StoreConfig`].

use std::path::PathBuf;
use std::str::FromStr;

use gilded_core::Karat;
use gilded_store::{ConfigError, StoreConfig};
use rust_decimal::Decimal;

use crate::pricing::PricingDefaults;

const DEFAULT_FAVORITES_DIR: &str = ".gilded";

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Document and blob store settings
    pub store: StoreConfig,
    /// Price calculator presets
    pub pricing: PricingDefaults,
    /// Where favorites are persisted between sessions
    pub favorites_dir: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = StoreConfig::from_lookup(&lookup)?;

        let karat = match lookup("GILDED_DEFAULT_KARAT") {
            Some(raw) => Karat::from_str(raw.trim()).map_err(|e| {
                ConfigError::InvalidEnvVar("GILDED_DEFAULT_KARAT".to_string(), e.to_string())
            })?,
            None => Karat::STANDARD,
        };
        let gold_rate = get_amount(&lookup, "GILDED_GOLD_RATE")?;
        let making_charge_percent = get_amount(&lookup, "GILDED_MAKING_CHARGE_PERCENT")?;

        let favorites_dir = lookup("GILDED_FAVORITES_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_FAVORITES_DIR), PathBuf::from);

        Ok(Self {
            store,
            pricing: PricingDefaults {
                karat,
                gold_rate,
                making_charge_percent,
            },
            favorites_dir,
        })
    }
}

/// Read a non-negative decimal, zero when unset.
fn get_amount<F>(lookup: &F, key: &str) -> Result<Decimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Decimal::ZERO);
    };
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(amount)
}
