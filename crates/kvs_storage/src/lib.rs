//! # kvs Storage
//!
//! Storage engine binding for kvs.
//!
//! This crate owns the memory-mapped LMDB environment backing a kvs
//! database. It knows nothing about metadata records or value limits; it
//! only opens the file, hands out engine transactions and releases
//! everything again.
//!
//! ## Design Principles
//!
//! - One file per database (`NO_SUB_DIR`), no inter-process locking
//!   (`NO_LOCK`); callers guarantee a single writer
//! - The map size is applied before the first transaction and never
//!   changes afterwards
//! - Exactly one table per environment: the unnamed main database
//! - Every transaction borrows its [`Environment`], so an environment can
//!   never be closed under a live transaction
//!
//! ## Example
//!
//! ```rust,no_run
//! use kvs_storage::{AccessMode, Environment, StorageConfig};
//! use std::path::Path;
//!
//! let config = StorageConfig::new().map_size(16 * 1024 * 1024);
//! let mut env = Environment::open(Path::new("db.kvs"), AccessMode::ReadWrite, &config).unwrap();
//!
//! let mut txn = env.begin().unwrap();
//! txn.put(b"key", b"value").unwrap();
//! txn.commit().unwrap();
//!
//! env.close();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod environment;
mod error;
mod txn;

pub use config::{AccessMode, StorageConfig, MAX_KEY_SIZE, PAGE_ALIGNMENT};
pub use environment::{Environment, EnvironmentInfo};
pub use error::{InitStep, StorageError, StorageResult, TxnOp};
pub use txn::EngineTxn;
