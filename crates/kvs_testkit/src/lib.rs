//! # kvs Testkit
//!
//! Test utilities for kvs.
//!
//! This crate provides:
//! - Temporary database fixtures that clean up after themselves
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kvs_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_database() {
//!     let store = TestStore::initialized(4);
//!     kvs_core::command::set(store.path(), b"foo", b"bar", store.config()).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
