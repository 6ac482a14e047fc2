//! LMDB environment lifecycle.

use crate::config::{AccessMode, StorageConfig};
use crate::error::{InitStep, StorageError, StorageResult, TxnOp};
use crate::txn::EngineTxn;
use heed::types::Bytes;
use heed::{Env, EnvFlags, EnvOpenOptions, MdbError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The single table every environment exposes.
pub(crate) type Table = heed::Database<Bytes, Bytes>;

/// Summary of an open environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInfo {
    /// Size of the memory map in bytes.
    pub map_size: u64,
    /// Number of the last page in use.
    pub last_page_number: u64,
    /// ID of the last committed transaction.
    pub last_txn_id: u64,
    /// Size of the backing file in bytes.
    pub file_size: u64,
}

/// An open LMDB environment backed by a single file.
///
/// The environment owns the memory map and the table identifier. Engine
/// transactions borrow it, so it cannot be closed while one is live.
///
/// # Lifecycle
///
/// - [`Environment::open`] creates the environment, applies the map size,
///   opens the file and opens the table
/// - [`Environment::begin`] starts a transaction in the environment's mode
/// - [`Environment::close`] releases the table and the environment; it is
///   idempotent and also runs on drop
///
/// # Concurrency
///
/// The environment is opened without LMDB's lock file. Nothing here stops a
/// second process from writing to the same file; callers must ensure there
/// is only ever one writer.
pub struct Environment {
    path: PathBuf,
    mode: AccessMode,
    map_size: Option<usize>,
    env: Option<Env>,
    table: Option<Table>,
}

impl Environment {
    /// Opens the environment at `path`.
    ///
    /// In [`AccessMode::ReadWrite`] the file is created if it does not exist.
    /// In [`AccessMode::ReadOnly`] it must already exist.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidMapSize`] if the configured map size is unusable
    /// - [`StorageError::Init`] if the environment or its table cannot be opened
    ///
    /// Anything acquired before the failing step is released before the
    /// error is returned.
    pub fn open(path: &Path, mode: AccessMode, config: &StorageConfig) -> StorageResult<Self> {
        config.validate()?;

        let env = open_env(path, mode, config)
            .map_err(|e| StorageError::init(InitStep::Environment, e))?;
        debug!(path = %path.display(), ?mode, map_size = ?config.map_size, "environment opened");

        // From here on `Drop` closes the environment if the table fails.
        let mut environment = Self {
            path: path.to_path_buf(),
            mode,
            map_size: config.map_size,
            env: Some(env),
            table: None,
        };

        let table = match &environment.env {
            Some(env) => open_table(env, mode)?,
            None => return Err(StorageError::Closed),
        };
        environment.table = Some(table);

        Ok(environment)
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the access mode the environment was opened with.
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Returns the map size requested at open time, if any.
    #[must_use]
    pub fn map_size(&self) -> Option<usize> {
        self.map_size
    }

    /// Returns true until [`Environment::close`] has run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    fn parts(&self) -> StorageResult<(&Env, Table)> {
        match (&self.env, self.table) {
            (Some(env), Some(table)) => Ok((env, table)),
            _ => Err(StorageError::Closed),
        }
    }

    /// Starts a transaction in the environment's access mode.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Closed`] if the environment has been closed
    /// - [`StorageError::Transaction`] if the engine refuses to start one
    pub fn begin(&self) -> StorageResult<EngineTxn<'_>> {
        let (env, table) = self.parts()?;

        let txn = match self.mode {
            AccessMode::ReadOnly => env.read_txn().map(|txn| EngineTxn::read(table, txn)),
            AccessMode::ReadWrite => env.write_txn().map(|txn| EngineTxn::write(table, txn)),
        }
        .map_err(|e| StorageError::transaction(TxnOp::Begin, e))?;

        debug!(mode = ?self.mode, "transaction started");
        Ok(txn)
    }

    /// Returns map and file statistics for the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment is closed or the file cannot be
    /// inspected.
    pub fn info(&self) -> StorageResult<EnvironmentInfo> {
        let (env, _) = self.parts()?;
        let info = env.info();
        let file_size = std::fs::metadata(&self.path)?.len();

        Ok(EnvironmentInfo {
            map_size: info.map_size as u64,
            last_page_number: info.last_page_number as u64,
            last_txn_id: info.last_txn_id as u64,
            file_size,
        })
    }

    /// Releases the table identifier and the environment.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn close(&mut self) {
        self.table = None;
        if let Some(env) = self.env.take() {
            env.prepare_for_closing().wait();
            debug!(path = %self.path.display(), "environment closed");
        }
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("map_size", &self.map_size)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.close();
    }
}

#[allow(unsafe_code)]
fn open_env(path: &Path, mode: AccessMode, config: &StorageConfig) -> heed::Result<Env> {
    let mut options = EnvOpenOptions::new();
    if let Some(size) = config.map_size {
        options.map_size(size);
    }

    let mut flags = EnvFlags::NO_SUB_DIR | EnvFlags::NO_LOCK;
    if mode.is_read_only() {
        flags |= EnvFlags::READ_ONLY;
    }

    // SAFETY: NO_LOCK leaves writer exclusion to the caller, which is the
    // documented contract of `Environment`. The file is only mapped by this
    // process for the lifetime of the returned `Env`.
    unsafe {
        options.flags(flags);
        options.open(path)
    }
}

fn open_table(env: &Env, mode: AccessMode) -> StorageResult<Table> {
    let fail = |e: heed::Error| StorageError::init(InitStep::Table, e);

    match mode {
        AccessMode::ReadOnly => {
            let rtxn = env.read_txn().map_err(fail)?;
            let table = env.open_database::<Bytes, Bytes>(&rtxn, None).map_err(fail)?;
            // Committing keeps the table identifier valid after the txn ends.
            rtxn.commit().map_err(fail)?;
            table.ok_or_else(|| fail(heed::Error::Mdb(MdbError::NotFound)))
        }
        AccessMode::ReadWrite => {
            let mut wtxn = env.write_txn().map_err(fail)?;
            let table = env.create_database::<Bytes, Bytes>(&mut wtxn, None).map_err(fail)?;
            wtxn.commit().map_err(fail)?;
            Ok(table)
        }
    }
}
