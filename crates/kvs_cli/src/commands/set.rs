//! Set command implementation.

use kvs_core::{command, Config, KvsResult};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Runs the set command.
///
/// Without an inline `value` the value is read from `input`, up to the
/// configured maximum value size.
pub fn run(
    path: &Path,
    key: &[u8],
    value: Option<&[u8]>,
    config: &Config,
    input: impl Read,
) -> KvsResult<()> {
    match value {
        Some(value) => command::set(path, key, value, config),
        None => {
            let value = command::read_value(input, config.max_value_size)?;
            debug!(len = value.len(), "read value from input");
            command::set(path, key, &value, config)
        }
    }
}
