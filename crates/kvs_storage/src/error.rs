//! Error types for storage operations.

use std::fmt;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Setup step that failed while opening an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Validating or applying the maximum map size.
    MapSize,
    /// Creating the environment and opening the backing file.
    Environment,
    /// Opening the table inside the environment.
    Table,
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapSize => f.write_str("map size"),
            Self::Environment => f.write_str("environment open"),
            Self::Table => f.write_str("table open"),
        }
    }
}

/// Transaction step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnOp {
    /// Starting a transaction.
    Begin,
    /// Committing a transaction.
    Commit,
}

impl fmt::Display for TxnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin => f.write_str("begin"),
            Self::Commit => f.write_str("commit"),
        }
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The environment, its file or its table could not be set up.
    #[error("engine init failed at {step}: {source}")]
    Init {
        /// The setup step that failed.
        step: InitStep,
        /// The underlying engine error.
        #[source]
        source: heed::Error,
    },

    /// A transaction could not be started or committed.
    #[error("transaction {op} failed: {source}")]
    Transaction {
        /// The transaction step that failed.
        op: TxnOp,
        /// The underlying engine error.
        #[source]
        source: heed::Error,
    },

    /// A record operation failed inside the engine.
    #[error("engine error: {0}")]
    Engine(#[from] heed::Error),

    /// An I/O error occurred outside the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested map size cannot be used.
    #[error("invalid map size {0}: must be a positive multiple of {align} bytes", align = crate::PAGE_ALIGNMENT)]
    InvalidMapSize(usize),

    /// A write was attempted through a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// The environment has already been closed.
    #[error("environment is closed")]
    Closed,
}

impl StorageError {
    /// Creates an init error for the given step.
    pub fn init(step: InitStep, source: heed::Error) -> Self {
        Self::Init { step, source }
    }

    /// Creates a transaction error for the given step.
    pub fn transaction(op: TxnOp, source: heed::Error) -> Self {
        Self::Transaction { op, source }
    }

    /// Returns true if the engine ran out of map space.
    #[must_use]
    pub fn is_map_full(&self) -> bool {
        let source = match self {
            Self::Init { source, .. } | Self::Transaction { source, .. } | Self::Engine(source) => {
                source
            }
            _ => return false,
        };
        matches!(source, heed::Error::Mdb(heed::MdbError::MapFull))
    }
}
