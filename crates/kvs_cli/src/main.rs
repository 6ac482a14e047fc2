//! kvs CLI
//!
//! Minimal transactional key-value store on a single LMDB file.
//!
//! # Commands
//!
//! - `init` - Create a database and write its metadata record
//! - `get` - Write a value to standard output
//! - `set` - Store a value, inline or from standard input
//! - `del` - Remove a record
//! - `info` - Display database statistics
//!
//! Exit status is 0 on success, 1 on an operational failure (missing key,
//! engine error, oversized value) and 2 on a usage error.

mod commands;

use clap::{Parser, Subcommand};
use commands::info::OutputFormat;
use kvs_core::Config;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Simple transactional key-value store.
#[derive(Parser)]
#[command(name = "kvs")]
#[command(author, version = kvs_core::VERSION, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a database of SIZE_MB mebibytes
    Init {
        /// Path to the database file
        path: PathBuf,

        /// Maximum database size in MiB
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        size_mb: u32,
    },

    /// Write the value stored under KEY to standard output
    Get {
        /// Path to the database file
        path: PathBuf,

        /// Key to look up
        key: OsString,
    },

    /// Store VALUE under KEY, reading standard input if VALUE is omitted
    Set {
        /// Path to the database file
        path: PathBuf,

        /// Key to store under
        key: OsString,

        /// Value to store
        value: Option<OsString>,
    },

    /// Remove the record stored under KEY
    Del {
        /// Path to the database file
        path: PathBuf,

        /// Key to remove
        key: OsString,
    },

    /// Display database statistics and metadata
    Info {
        /// Path to the database file
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::default();
    let result = match cli.command {
        Commands::Init { path, size_mb } => commands::init::run(&path, size_mb, &config),
        Commands::Get { path, key } => commands::get::run(
            &path,
            key.as_encoded_bytes(),
            &config,
            &mut io::stdout().lock(),
        ),
        Commands::Set { path, key, value } => commands::set::run(
            &path,
            key.as_encoded_bytes(),
            value.as_ref().map(|v| v.as_encoded_bytes()),
            &config,
            io::stdin().lock(),
        ),
        Commands::Del { path, key } => {
            commands::del::run(&path, key.as_encoded_bytes(), &config)
        }
        Commands::Info { path, format } => {
            commands::info::run(&path, format, &config, &mut io::stdout().lock())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("kvs: {e}");
            ExitCode::FAILURE
        }
    }
}
