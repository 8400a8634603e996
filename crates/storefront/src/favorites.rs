//! Visitor favorites.
//!
//! Favorites never touch the document store. They live in client-local
//! storage under a single entry holding a JSON array of product ids. Storage
//! failures are logged and otherwise ignored: the in-memory set remains the
//! source of truth for the rest of the session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use gilded_core::ProductId;
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the storage entry holding the favorites list.
pub const FAVORITES_ENTRY: &str = "favorites";

/// Errors from a favorites storage backend.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid entry name: {0}")]
    InvalidEntry(String),
    #[error("storage state poisoned")]
    Poisoned,
}

/// Client-local key/value storage for small string entries.
pub trait FavoritesStorage: Send + Sync {
    /// Read an entry, `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, entry: &str) -> Result<Option<String>, FavoritesError>;

    /// Write an entry, replacing the previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, entry: &str, value: &str) -> Result<(), FavoritesError>;
}

/// One JSON file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, entry: &str) -> Result<PathBuf, FavoritesError> {
        let valid = !entry.is_empty()
            && entry
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FavoritesError::InvalidEntry(entry.to_string()));
        }
        Ok(self.dir.join(format!("{entry}.json")))
    }
}

impl FavoritesStorage for FileStorage {
    fn load(&self, entry: &str) -> Result<Option<String>, FavoritesError> {
        let path = self.path_for(entry)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entry: &str, value: &str) -> Result<(), FavoritesError> {
        let path = self.path_for(entry)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }
}

/// Storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoritesStorage for MemoryStorage {
    fn load(&self, entry: &str) -> Result<Option<String>, FavoritesError> {
        let entries = self.entries.lock().map_err(|_| FavoritesError::Poisoned)?;
        Ok(entries.get(entry).cloned())
    }

    fn save(&self, entry: &str, value: &str) -> Result<(), FavoritesError> {
        let mut entries = self.entries.lock().map_err(|_| FavoritesError::Poisoned)?;
        entries.insert(entry.to_string(), value.to_string());
        Ok(())
    }
}

/// An ordered set of favorite product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: Vec<ProductId>,
}

impl Favorites {
    /// Build a set from ids, dropping duplicates but keeping first-seen order.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        let mut favorites = Self::default();
        for id in ids {
            if !favorites.contains(&id) {
                favorites.ids.push(id);
            }
        }
        favorites
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// Add the id if absent, remove it if present. Returns whether the id is
    /// a favorite afterwards.
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        if let Some(position) = self.ids.iter().position(|existing| existing == id) {
            self.ids.remove(position);
            false
        } else {
            self.ids.push(id.clone());
            true
        }
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Favorites bound to the storage they persist to.
#[derive(Debug)]
pub struct FavoritesStore<S> {
    storage: S,
    favorites: Favorites,
}

impl<S: FavoritesStorage> FavoritesStore<S> {
    /// Load favorites from storage. A missing, unreadable or malformed entry
    /// starts an empty set.
    pub fn load(storage: S) -> Self {
        let favorites = match storage.load(FAVORITES_ENTRY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ProductId>>(&raw) {
                Ok(ids) => Favorites::from_ids(ids),
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed favorites entry");
                    Favorites::default()
                }
            },
            Ok(None) => Favorites::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load favorites");
                Favorites::default()
            }
        };
        debug!(count = favorites.len(), "Favorites loaded");
        Self { storage, favorites }
    }

    #[must_use]
    pub const fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Toggle a product and persist the new set. Returns whether the product
    /// is a favorite afterwards.
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        let is_favorite = self.favorites.toggle(id);
        self.persist();
        is_favorite
    }

    fn persist(&self) {
        let result = serde_json::to_string(self.favorites.ids())
            .map_err(FavoritesError::from)
            .and_then(|raw| self.storage.save(FAVORITES_ENTRY, &raw));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist favorites");
        }
    }
}
