//! Test fixtures and database helpers.

use kvs_core::{command, Config};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name used for fixture databases.
pub const DB_FILE: &str = "test.kvs";

/// A database file in a temporary directory, removed on drop.
pub struct TestStore {
    path: PathBuf,
    config: Config,
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates a fixture whose database file does not exist yet.
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            path: temp_dir.path().join(DB_FILE),
            config: Config::default(),
            _temp_dir: temp_dir,
        }
    }

    /// Creates a fixture initialized with a map of `size_mb` mebibytes.
    pub fn initialized(size_mb: u32) -> Self {
        let store = Self::empty();
        command::init(&store.path, size_mb, &store.config).expect("Failed to initialize database");
        store
    }

    /// Replaces the configuration used by [`TestStore::config`].
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration tests should open the database with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stores `value` under `key`, panicking on failure.
    pub fn set(&self, key: &[u8], value: &[u8]) {
        command::set(&self.path, key, value, &self.config).expect("Failed to set value");
    }

    /// Returns the value under `key`, or `None` if it is absent.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match command::get(&self.path, key, &self.config) {
            Ok(value) => Some(value),
            Err(e) if e.is_not_found() => None,
            Err(e) => panic!("Failed to get value: {e}"),
        }
    }
}
