//! Info command implementation.

use clap::ValueEnum;
use kvs_core::{command, Config, DatabaseInfo, KvsResult};
use std::io::Write;
use std::path::Path;

/// Output format for the info command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Pretty-printed JSON object
    Json,
}

/// Runs the info command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    config: &Config,
    out: &mut impl Write,
) -> KvsResult<()> {
    let info = command::info(path, config)?;

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &info)?;
            writeln!(out)?;
        }
        OutputFormat::Text => print_text_output(&info, out)?,
    }

    out.flush()?;
    Ok(())
}

fn print_text_output(info: &DatabaseInfo, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "kvs Database Info")?;
    writeln!(out, "=================")?;
    writeln!(out)?;
    writeln!(out, "Path: {}", info.path.display())?;
    writeln!(out)?;
    writeln!(out, "Storage:")?;
    writeln!(out, "  File size:     {}", format_size(info.file_size))?;
    writeln!(out, "  Map size:      {}", format_size(info.map_size))?;
    writeln!(out, "  Last page:     {}", info.last_page_number)?;
    writeln!(out, "  Last txn:      {}", info.last_txn_id)?;
    writeln!(out)?;
    writeln!(out, "Records:")?;
    writeln!(out, "  Entries:       {}", info.entries)?;
    match info.metadata_version {
        Some(version) => writeln!(out, "  Format:        version {version}")?,
        None => writeln!(out, "  Format:        not initialized")?,
    }
    Ok(())
}

const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Renders a byte count with a binary unit, e.g. `1.5 MiB`.
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut scaled = bytes as f64 / 1024.0;
    let mut unit = 0;
    while scaled >= 1024.0 && unit + 1 < UNITS.len() {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{scaled:.1} {}", UNITS[unit])
}
