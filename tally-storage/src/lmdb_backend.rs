//! LMDB-backed configuration store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to keep every collection's
//! configuration in one memory-mapped environment. Each key is written in
//! its own write transaction; reads use short-lived read transactions.

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tally_core::{CollectionId, Configuration, StorageError, StoreConfig, TallyResult};

use crate::{
    cards_key, collapsed_key, decode_configuration, decode_flag, encode_configuration,
    encode_flag, ConfigurationStore,
};

fn backend_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend {
        reason: e.to_string(),
    }
}

/// Configuration store persisted in an LMDB environment.
pub struct LmdbConfigurationStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
}

impl LmdbConfigurationStore {
    /// Open (or create) the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    pub fn open(config: &StoreConfig) -> TallyResult<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.path).map_err(backend_error)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size())
                .max_dbs(1)
                .open(&config.path)
        }
        .map_err(backend_error)?;

        let mut wtxn = env.write_txn().map_err(backend_error)?;
        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(backend_error)?;
        wtxn.commit().map_err(backend_error)?;

        tracing::debug!(path = %config.path.display(), "opened configuration store");
        Ok(Self { env, db })
    }

    fn get(&self, key: &str) -> TallyResult<Option<Vec<u8>>> {
        let rtxn = self.env.read_txn().map_err(backend_error)?;
        let bytes = self
            .db
            .get(&rtxn, key.as_bytes())
            .map_err(backend_error)?
            .map(|b| b.to_vec());
        Ok(bytes)
    }

    fn put(&self, key: &str, bytes: &[u8]) -> TallyResult<()> {
        let mut wtxn = self.env.write_txn().map_err(backend_error)?;
        self.db
            .put(&mut wtxn, key.as_bytes(), bytes)
            .map_err(backend_error)?;
        wtxn.commit().map_err(backend_error)?;
        Ok(())
    }
}

impl ConfigurationStore for LmdbConfigurationStore {
    fn load(&self, collection: &CollectionId) -> TallyResult<Option<Configuration>> {
        let key = cards_key(collection);
        self.get(&key)?
            .map(|bytes| decode_configuration(&key, &bytes))
            .transpose()
    }

    fn save(&self, collection: &CollectionId, configuration: &Configuration) -> TallyResult<()> {
        let bytes = encode_configuration(configuration)?;
        self.put(&cards_key(collection), &bytes)
    }

    fn clear(&self, collection: &CollectionId) -> TallyResult<()> {
        let mut wtxn = self.env.write_txn().map_err(backend_error)?;
        for key in [cards_key(collection), collapsed_key(collection)] {
            self.db
                .delete(&mut wtxn, key.as_bytes())
                .map_err(backend_error)?;
        }
        wtxn.commit().map_err(backend_error)?;
        Ok(())
    }

    fn load_collapsed(&self, collection: &CollectionId) -> TallyResult<Option<bool>> {
        let key = collapsed_key(collection);
        self.get(&key)?
            .map(|bytes| decode_flag(&key, &bytes))
            .transpose()
    }

    fn save_collapsed(&self, collection: &CollectionId, collapsed: bool) -> TallyResult<()> {
        self.put(&collapsed_key(collection), &encode_flag(collapsed))
    }
}
