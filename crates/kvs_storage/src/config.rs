//! Environment configuration.

use crate::error::{StorageError, StorageResult};

/// Map sizes must be a multiple of this many bytes.
pub const PAGE_ALIGNMENT: usize = 4096;

/// Largest key LMDB accepts with its default build options.
pub const MAX_KEY_SIZE: usize = 511;

/// How an environment and its transactions access the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read-only: the file must exist and is never modified.
    ReadOnly,
    /// Read-write: the file is created if missing.
    ReadWrite,
}

impl AccessMode {
    /// Returns true for [`AccessMode::ReadOnly`].
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

/// Configuration applied when an environment is opened.
///
/// Everything here is fixed for the lifetime of the environment. In
/// particular the map size is set before the first transaction starts;
/// LMDB cannot grow a mapping that a live transaction is using.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Maximum size of the memory map in bytes.
    ///
    /// `None` keeps the size recorded in an existing file, or LMDB's
    /// default for a new one.
    pub map_size: Option<usize>,
}

impl StorageConfig {
    /// Creates a configuration with default values.
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

    /// Checks that the configuration can be applied to an environment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidMapSize`] if the map size is zero or
    /// not page aligned.
    pub fn validate(&self) -> StorageResult<()> {
        match self.map_size {
            Some(size) if size == 0 || size % PAGE_ALIGNMENT != 0 => {
                Err(StorageError::InvalidMapSize(size))
            }
            _ => Ok(()),
        }
    }
}
