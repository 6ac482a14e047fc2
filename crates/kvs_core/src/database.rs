//! Database facade.

use crate::config::Config;
use crate::error::KvsResult;
use crate::handle::Handle;
use kvs_storage::{AccessMode, Environment};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// An open database file.
///
/// `Database` owns the storage environment; [`Database::begin`] hands out a
/// [`Handle`] that borrows it, so the database cannot be closed while a
/// transaction is live.
///
/// # Example
///
/// ```rust,no_run
/// use kvs_core::{AccessMode, Config, Database};
/// use std::path::Path;
///
/// let mut db = Database::open(Path::new("db.kvs"), AccessMode::ReadWrite, &Config::default())?;
/// {
///     let mut handle = db.begin()?;
///     handle.put(b"foo", b"bar")?;
///     handle.commit()?;
/// }
/// db.close();
/// # Ok::<(), kvs_core::KvsError>(())
/// ```
#[derive(Debug)]
pub struct Database {
    env: Environment,
    max_value_size: usize,
}

/// Summary of a database, as reported by `kvs info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    /// Path of the database file.
    pub path: PathBuf,
    /// Size of the database file in bytes.
    pub file_size: u64,
    /// Maximum map size in bytes.
    pub map_size: u64,
    /// Number of the last page in use.
    pub last_page_number: u64,
    /// ID of the last committed transaction.
    pub last_txn_id: u64,
    /// Number of records, including the metadata record.
    pub entries: u64,
    /// Metadata format version, if the database was initialized.
    pub metadata_version: Option<u32>,
}

impl Database {
    /// Opens the database at `path` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`KvsError::Storage`](crate::KvsError::Storage) if the
    /// environment or its table cannot be set up.
    pub fn open(path: &Path, mode: AccessMode, config: &Config) -> KvsResult<Self> {
        let env = Environment::open(path, mode, &config.storage())?;
        Ok(Self {
            env,
            max_value_size: config.max_value_size,
        })
    }

    /// Starts the database's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is closed or the engine cannot
    /// start a transaction.
    pub fn begin(&self) -> KvsResult<Handle<'_>> {
        let txn = self.env.begin()?;
        Ok(Handle::new(txn, self.max_value_size))
    }

    /// Returns the path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.env.path()
    }

    /// Returns the access mode the database was opened with.
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.env.mode()
    }

    /// Returns true until [`Database::close`] has run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.env.is_open()
    }

    /// Collects file, map and record statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is closed, the metadata record is
    /// malformed, or the engine fails.
    pub fn info(&self) -> KvsResult<DatabaseInfo> {
        let env_info = self.env.info()?;
        let mut handle = self.begin()?;
        let entries = handle.entries()?;
        let metadata_version = handle.metadata()?.map(|m| m.version);
        handle.abort();

        Ok(DatabaseInfo {
            path: self.path().to_path_buf(),
            file_size: env_info.file_size,
            map_size: env_info.map_size,
            last_page_number: env_info.last_page_number,
            last_txn_id: env_info.last_txn_id,
            entries,
            metadata_version,
        })
    }

    /// Releases the environment and the file.
    ///
    /// Safe to call more than once. Never fails; release problems are
    /// logged.
    pub fn close(&mut self) {
        self.env.close();
    }
}

/// Runs one complete handle lifecycle around `f`.
///
/// Opens the database, starts its transaction, calls `f`, aborts the
/// transaction if `f` left it live, and closes the database. Release runs
/// on every path, so `f` decides durability only by calling
/// [`Handle::commit`].
///
/// # Errors
///
/// Returns the first error from opening, starting the transaction, or `f`.
pub fn with_handle<T, F>(path: &Path, mode: AccessMode, config: &Config, f: F) -> KvsResult<T>
where
    F: FnOnce(&mut Handle<'_>) -> KvsResult<T>,
{
    let mut db = Database::open(path, mode, config)?;

    let result = match db.begin() {
        Ok(mut handle) => {
            let result = f(&mut handle);
            handle.close();
            result
        }
        Err(e) => Err(e),
    };

    db.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandleState, KvsError};
    use kvs_storage::{InitStep, StorageError};
    use tempfile::tempdir;

    fn config() -> Config {
        Config::new().map_size(4 * 1024 * 1024)
    }

    #[test]
    fn open_and_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.kvs");

        let mut db = Database::open(&path, AccessMode::ReadWrite, &config()).unwrap();
        assert!(db.is_open());
        assert_eq!(db.path(), path);
        assert_eq!(db.mode(), AccessMode::ReadWrite);

        db.close();
        db.close();
        assert!(!db.is_open());
        assert!(db.begin().is_err());
    }

    #[test]
    fn open_read_only_missing_file_is_init_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.kvs");

        let err = Database::open(&path, AccessMode::ReadOnly, &config()).unwrap_err();
        assert!(matches!(
            err,
            KvsError::Storage(StorageError::Init {
                step: InitStep::Environment,
                ..
            })
        ));
    }

    #[test]
    fn with_handle_commits_only_when_asked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.kvs");

        with_handle(&path, AccessMode::ReadWrite, &config(), |handle| {
            handle.put(b"kept", b"1")
        })
        .unwrap();

        with_handle(&path, AccessMode::ReadWrite, &config(), |handle| {
            handle.put(b"committed", b"2")?;
            handle.commit()
        })
        .unwrap();

        with_handle(&path, AccessMode::ReadOnly, &config(), |handle| {
            assert!(handle.get(b"kept").unwrap_err().is_not_found());
            assert_eq!(handle.get(b"committed")?, b"2");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn with_handle_releases_on_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.kvs");

        let err = with_handle(&path, AccessMode::ReadWrite, &config(), |handle| {
            handle.put(b"foo", b"bar")?;
            handle.delete(b"missing")?;
            handle.commit()
        })
        .unwrap_err();
        assert!(err.is_not_found());

        // The environment was released, so it can be opened again.
        let state = with_handle(&path, AccessMode::ReadWrite, &config(), |handle| {
            assert!(handle.get(b"foo").unwrap_err().is_not_found());
            Ok(handle.state())
        })
        .unwrap();
        assert_eq!(state, HandleState::Active);
    }

    #[test]
    fn info_counts_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.kvs");
        let db = Database::open(&path, AccessMode::ReadWrite, &config()).unwrap();

        {
            let mut handle = db.begin().unwrap();
            handle.put(b"a", b"1").unwrap();
            handle.put(b"b", b"2").unwrap();
            handle.commit().unwrap();
        }

        let info = db.info().unwrap();
        assert_eq!(info.entries, 2);
        assert_eq!(info.metadata_version, None);
        assert_eq!(info.map_size, 4 * 1024 * 1024);
        assert_eq!(info.path, path);
    }
}
