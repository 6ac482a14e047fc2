//! Database configuration.

use crate::error::{KvsError, KvsResult};
use kvs_storage::StorageConfig;

/// Default upper bound for a single value: 1 MiB.
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1024 * 1024;

const MIB: usize = 1024 * 1024;

/// Configuration for opening a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum size of the memory map in bytes (`None` keeps the file's).
    pub map_size: Option<usize>,

    /// Largest value `put` accepts, in bytes.
    pub max_value_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_size: None,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum map size in bytes.
    #[must_use]
    pub const fn map_size(mut self, bytes: usize) -> Self {
        self.map_size = Some(bytes);
        self
    }

    /// Sets the maximum map size in mebibytes.
    ///
    /// # Errors
    ///
    /// Returns [`KvsError::InvalidSize`] if `size_mb` is zero or the size in
    /// bytes does not fit in `usize`.
    pub fn map_size_mb(self, size_mb: u32) -> KvsResult<Self> {
        if size_mb == 0 {
            return Err(KvsError::invalid_size("size must be a positive number of MiB"));
        }
        let bytes = usize::try_from(size_mb)
            .ok()
            .and_then(|mb| mb.checked_mul(MIB))
            .ok_or_else(|| KvsError::invalid_size(format!("{size_mb} MiB is too large")))?;
        Ok(self.map_size(bytes))
    }

    /// Sets the largest accepted value size.
    #[must_use]
    pub const fn max_value_size(mut self, bytes: usize) -> Self {
        self.max_value_size = bytes;
        self
    }

    /// Returns the storage engine part of the configuration.
    #[must_use]
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            map_size: self.map_size,
        }
    }
}
