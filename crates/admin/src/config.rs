//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GILDED_MAX_IMAGE_BYTES` - Largest accepted image upload (default: 5 MiB)
//!
//! Store variables are documented on [`StoreConfig`].

use gilded_store::{ConfigError, StoreConfig};

const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Document and blob store settings
    pub store: StoreConfig,
    /// Uploads above this size fail validation
    pub max_image_bytes: usize,
}

impl AdminConfig {
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
        let max_image_bytes = match lookup("GILDED_MAX_IMAGE_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "GILDED_MAX_IMAGE_BYTES".to_string(),
                        format!("expected a positive byte count, got {raw:?}"),
                    )
                })?,
            None => DEFAULT_MAX_IMAGE_BYTES,
        };

        Ok(Self {
            store,
            max_image_bytes,
        })
    }

    /// Configuration for a purely in-memory deployment.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: StoreConfig::in_memory(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}
