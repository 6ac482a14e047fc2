//! Init command implementation.

use kvs_core::{command, Config, KvsResult};
use std::path::Path;

/// Runs the init command.
pub fn run(path: &Path, size_mb: u32, config: &Config) -> KvsResult<()> {
    command::init(path, size_mb, config)
}
