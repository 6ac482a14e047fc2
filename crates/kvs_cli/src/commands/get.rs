//! Get command implementation.

use kvs_core::{command, Config, KvsResult};
use std::io::Write;
use std::path::Path;

/// Runs the get command, writing the raw value bytes to `out`.
pub fn run(path: &Path, key: &[u8], config: &Config, out: &mut impl Write) -> KvsResult<()> {
    let value = command::get(path, key, config)?;
    out.write_all(&value)?;
    out.flush()?;
    Ok(())
}
