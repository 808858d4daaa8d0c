//! Tally Storage - Configuration Store Trait and Backends
//!
//! Per-collection dashboard configuration is a small JSON document kept in a
//! key-value store. The configuration and its collapse flag live under
//! separate keys so either can be written without touching the other.

pub mod lmdb_backend;
pub mod session;

pub use lmdb_backend::LmdbConfigurationStore;
pub use session::DashboardSession;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tally_core::{CollectionId, Configuration, StorageError, TallyResult};

// ============================================================================
// KEYS AND ENCODING
// ============================================================================

/// Key of the saved configuration for a collection.
pub fn cards_key(collection: &CollectionId) -> String {
    format!("cards:{}", collection)
}

/// Key of the collapse flag for a collection.
pub fn collapsed_key(collection: &CollectionId) -> String {
    format!("collapsed:{}", collection)
}

pub fn encode_configuration(configuration: &Configuration) -> TallyResult<Vec<u8>> {
    serde_json::to_vec(configuration).map_err(|e| {
        StorageError::Serialization {
            reason: e.to_string(),
        }
        .into()
    })
}

pub fn decode_configuration(key: &str, bytes: &[u8]) -> TallyResult<Configuration> {
    serde_json::from_slice(bytes).map_err(|e| {
        StorageError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

pub fn encode_flag(flag: bool) -> Vec<u8> {
    if flag { b"true".to_vec() } else { b"false".to_vec() }
}

pub fn decode_flag(key: &str, bytes: &[u8]) -> TallyResult<bool> {
    serde_json::from_slice(bytes).map_err(|e| {
        StorageError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Key-value persistence for per-collection dashboard configuration.
///
/// `load` and `load_collapsed` return `Ok(None)` when nothing was saved and
/// `Err(StorageError::Corrupt)` when the stored bytes cannot be decoded.
pub trait ConfigurationStore: Send + Sync {
    /// Load the saved configuration for a collection.
    fn load(&self, collection: &CollectionId) -> TallyResult<Option<Configuration>>;

    /// Replace the saved configuration for a collection.
    fn save(&self, collection: &CollectionId, configuration: &Configuration) -> TallyResult<()>;

    /// Forget everything saved for a collection.
    fn clear(&self, collection: &CollectionId) -> TallyResult<()>;

    /// Load the collapse flag for a collection.
    fn load_collapsed(&self, collection: &CollectionId) -> TallyResult<Option<bool>>;

    /// Save the collapse flag for a collection.
    fn save_collapsed(&self, collection: &CollectionId, collapsed: bool) -> TallyResult<()>;
}

// ============================================================================
// MOCK STORE
// ============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MockConfigurationStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MockConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write arbitrary bytes under a key.
    pub fn put_raw(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> TallyResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key.into(), bytes.into());
        Ok(())
    }

    /// Raw bytes stored under a key.
    pub fn get_raw(&self, key: &str) -> TallyResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigurationStore for MockConfigurationStore {
    fn load(&self, collection: &CollectionId) -> TallyResult<Option<Configuration>> {
        let key = cards_key(collection);
        self.get_raw(&key)?
            .map(|bytes| decode_configuration(&key, &bytes))
            .transpose()
    }

    fn save(&self, collection: &CollectionId, configuration: &Configuration) -> TallyResult<()> {
        let bytes = encode_configuration(configuration)?;
        self.put_raw(cards_key(collection), bytes)
    }

    fn clear(&self, collection: &CollectionId) -> TallyResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        entries.remove(&cards_key(collection));
        entries.remove(&collapsed_key(collection));
        Ok(())
    }

    fn load_collapsed(&self, collection: &CollectionId) -> TallyResult<Option<bool>> {
        let key = collapsed_key(collection);
        self.get_raw(&key)?
            .map(|bytes| decode_flag(&key, &bytes))
            .transpose()
    }

    fn save_collapsed(&self, collection: &CollectionId, collapsed: bool) -> TallyResult<()> {
        self.put_raw(collapsed_key(collection), encode_flag(collapsed))
    }
}

// ============================================================================
// TESTS
// ============================================================================
