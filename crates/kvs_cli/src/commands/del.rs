//! Del command implementation.

use kvs_core::{command, Config, KvsResult};
use std::path::Path;

/// Runs the del command.
pub fn run(path: &Path, key: &[u8], config: &Config) -> KvsResult<()> {
    command::delete(path, key, config)
}
