//! CLI command implementations.

pub mod del;
pub mod get;
pub mod info;
pub mod init;
pub mod set;
