//! # kvs Core
//!
//! Transaction lifecycle manager for kvs.
//!
//! This crate provides:
//! - [`Database`], which owns one open database file
//! - [`Handle`], the single live transaction of a database, with record
//!   operations (get, put, delete) and commit/abort
//! - [`with_handle`], which runs one complete open → transaction →
//!   commit/abort → close lifecycle
//! - The [`command`] functions used by the `kvs` command line
//! - The versioned [`Metadata`] record written by `init`
//!
//! ## Example
//!
//! ```rust,no_run
//! use kvs_core::{with_handle, AccessMode, Config};
//! use std::path::Path;
//!
//! let config = Config::default();
//! with_handle(Path::new("db.kvs"), AccessMode::ReadWrite, &config, |handle| {
//!     handle.put(b"foo", b"bar")?;
//!     handle.commit()
//! })?;
//! # Ok::<(), kvs_core::KvsError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
mod config;
mod database;
mod error;
mod handle;
mod metadata;

pub use config::{Config, DEFAULT_MAX_VALUE_SIZE};
pub use database::{with_handle, Database, DatabaseInfo};
pub use error::{KvsError, KvsResult};
pub use handle::{Handle, HandleState};
pub use kvs_storage::{AccessMode, MAX_KEY_SIZE};
pub use metadata::{Metadata, FORMAT_VERSION, METADATA_KEY};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
