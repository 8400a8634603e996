//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GILDED_DATABASE_URL` - `PostgreSQL` connection string for documents
//!   (falls back to `DATABASE_URL`; unset means an in-memory store)
//! - `GILDED_BLOB_DIR` - Directory for uploaded images (unset means in-memory blobs)
//! - `GILDED_BLOB_BASE_URL` - Public URL the blob directory is served from
//!   (default: `http://localhost:8080/blobs/`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_BLOB_BASE_URL: &str = "http://localhost:8080/blobs/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where documents and blobs are kept.
#[derive(Clone)]
pub struct StoreConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Directory for filesystem blobs
    pub blob_dir: Option<PathBuf>,
    /// Public base URL for filesystem blobs
    pub blob_base_url: Url,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("blob_dir", &self.blob_dir)
            .field("blob_base_url", &self.blob_base_url.as_str())
            .finish()
    }
}

impl StoreConfig {
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
        let database_url = lookup("GILDED_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .map(SecretString::from);

        let blob_dir = lookup("GILDED_BLOB_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let raw_base_url =
            lookup("GILDED_BLOB_BASE_URL").unwrap_or_else(|| DEFAULT_BLOB_BASE_URL.to_string());
        let blob_base_url = Url::parse(&raw_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("GILDED_BLOB_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            database_url,
            blob_dir,
            blob_base_url,
        })
    }

    /// Configuration for a purely in-memory deployment.
    ///
    /// # Panics
    ///
    /// Only if the built-in default base URL fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn in_memory() -> Self {
        Self {
            database_url: None,
            blob_dir: None,
            blob_base_url: Url::parse(DEFAULT_BLOB_BASE_URL).expect("default base url parses"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_in_memory() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.blob_dir.is_none());
        assert_eq!(config.blob_base_url.as_str(), DEFAULT_BLOB_BASE_URL);
    }

    #[test]
    fn test_database_url_fallback() {
        let config =
            StoreConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/gilded")])).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://db/gilded"
        );
    }

    #[test]
    fn test_primary_database_url_wins() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://fallback/db"),
            ("GILDED_DATABASE_URL", "postgres://primary/db"),
        ]))
        .unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://primary/db"
        );
    }

    #[test]
    fn test_invalid_blob_base_url() {
        let result = StoreConfig::from_lookup(lookup(&[("GILDED_BLOB_BASE_URL", "not a url")]));
        // irrefutable: every store setting is optional, so invalid is the only failure
        let ConfigError::InvalidEnvVar(name, _) = result.unwrap_err();
        assert_eq!(name, "GILDED_BLOB_BASE_URL");
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = StoreConfig::from_lookup(lookup(&[(
            "GILDED_DATABASE_URL",
            "postgres://user:hunter2@db/gilded",
        )]))
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
