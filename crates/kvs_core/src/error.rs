//! Error types for kvs core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type KvsResult<T> = Result<T, KvsError>;

/// Errors that can occur in kvs core operations.
#[derive(Debug, Error)]
pub enum KvsError {
    /// Storage engine error (environment setup, transactions, records).
    #[error(transparent)]
    Storage(#[from] kvs_storage::StorageError),

    /// Key not present in the database.
    #[error("key not found: {key}")]
    NotFound {
        /// The key, lossily decoded for display.
        key: String,
    },

    /// Value exceeds the configured maximum size.
    #[error("value too large: {size} bytes exceeds maximum of {max}")]
    ValueTooLarge {
        /// Size of the rejected value.
        size: usize,
        /// Maximum accepted size.
        max: usize,
    },

    /// Key is empty or longer than the engine allows.
    #[error("invalid key: {message}")]
    InvalidKey {
        /// Why the key was rejected.
        message: String,
    },

    /// Database size is not a positive number of mebibytes.
    #[error("invalid database size: {message}")]
    InvalidSize {
        /// Why the size was rejected.
        message: String,
    },

    /// Write attempted through a read-only handle.
    #[error("handle is read-only")]
    ReadOnly,

    /// Operation not permitted in the handle's current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// Metadata record is missing, malformed, or of an unknown version.
    #[error("invalid metadata: {message}")]
    Metadata {
        /// Description of the problem.
        message: String,
    },

    /// Metadata JSON could not be encoded or decoded.
    #[error("metadata encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl KvsError {
    /// Creates a not-found error for `key`.
    pub fn not_found(key: &[u8]) -> Self {
        Self::NotFound {
            key: String::from_utf8_lossy(key).into_owned(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates an invalid size error.
    pub fn invalid_size(message: impl Into<String>) -> Self {
        Self::InvalidSize {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a metadata error.
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata {
            message: message.into(),
        }
    }

    /// Returns true if this is a [`KvsError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
