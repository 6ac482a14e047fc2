//! One-shot operations behind the `kvs` command line.
//!
//! Each function here is one complete lifecycle: open the database, run a
//! single logical operation in its transaction, commit if it writes, and
//! close. Nothing is kept between calls.

use crate::config::Config;
use crate::database::{with_handle, DatabaseInfo};
use crate::error::{KvsError, KvsResult};
use crate::metadata::{Metadata, METADATA_KEY};
use crate::Database;
use kvs_storage::AccessMode;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Creates (or re-initializes) the database at `path` with a map of
/// `size_mb` mebibytes, writing only the metadata record.
///
/// # Errors
///
/// - [`KvsError::InvalidSize`] if `size_mb` is zero
/// - [`KvsError::Storage`] if the database cannot be created or committed
pub fn init(path: &Path, size_mb: u32, config: &Config) -> KvsResult<()> {
    let config = config.clone().map_size_mb(size_mb)?;
    let metadata = Metadata::current().encode()?;

    with_handle(path, AccessMode::ReadWrite, &config, |handle| {
        handle.put(METADATA_KEY, &metadata)?;
        handle.commit()
    })?;

    info!(path = %path.display(), size_mb, "database initialized");
    Ok(())
}

/// Returns the value stored under `key`.
///
/// # Errors
///
/// - [`KvsError::NotFound`] if there is no such record
/// - [`KvsError::Storage`] if the database cannot be opened
pub fn get(path: &Path, key: &[u8], config: &Config) -> KvsResult<Vec<u8>> {
    with_handle(path, AccessMode::ReadOnly, config, |handle| handle.get(key))
}

/// Stores `value` under `key` and commits.
///
/// # Errors
///
/// - [`KvsError::InvalidKey`] for the reserved metadata key
/// - [`KvsError::ValueTooLarge`] if `value` exceeds the configured maximum
/// - [`KvsError::Storage`] if the write or commit fails
pub fn set(path: &Path, key: &[u8], value: &[u8], config: &Config) -> KvsResult<()> {
    ensure_not_reserved(key)?;
    with_handle(path, AccessMode::ReadWrite, config, |handle| {
        handle.put(key, value)?;
        handle.commit()
    })
}

/// Removes the record under `key` and commits.
///
/// # Errors
///
/// - [`KvsError::InvalidKey`] for the reserved metadata key
/// - [`KvsError::NotFound`] if there is no such record
/// - [`KvsError::Storage`] if the delete or commit fails
pub fn delete(path: &Path, key: &[u8], config: &Config) -> KvsResult<()> {
    ensure_not_reserved(key)?;
    with_handle(path, AccessMode::ReadWrite, config, |handle| {
        handle.delete(key)?;
        handle.commit()
    })
}

/// Reports statistics for the database at `path`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or read.
pub fn info(path: &Path, config: &Config) -> KvsResult<DatabaseInfo> {
    let mut db = Database::open(path, AccessMode::ReadOnly, config)?;
    let info = db.info();
    db.close();
    info
}

/// Reads a value from `reader`, accepting at most `max` bytes.
///
/// One byte past the limit is read so an oversized input is reported
/// instead of silently truncated.
///
/// # Errors
///
/// - [`KvsError::ValueTooLarge`] if the input is longer than `max`
/// - [`KvsError::Io`] if reading fails
pub fn read_value<R: Read>(reader: R, max: usize) -> KvsResult<Vec<u8>> {
    let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
    let mut value = Vec::new();
    reader.take(limit).read_to_end(&mut value)?;

    if value.len() > max {
        return Err(KvsError::ValueTooLarge {
            size: value.len(),
            max,
        });
    }
    Ok(value)
}

fn ensure_not_reserved(key: &[u8]) -> KvsResult<()> {
    if key == METADATA_KEY {
        return Err(KvsError::invalid_key(
            "'.kvs' is reserved for database metadata",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn init_writes_only_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.kvs");

        init(&path, 1, &Config::default()).unwrap();

        let value = get(&path, METADATA_KEY, &Config::default()).unwrap();
        assert_eq!(value, b"{\n  \"version\": 1\n}\n");

        let info = info(&path, &Config::default()).unwrap();
        assert_eq!(info.entries, 1);
        assert_eq!(info.metadata_version, Some(1));
        assert_eq!(info.map_size, 1024 * 1024);
    }

    #[test]
    fn init_rejects_zero_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.kvs");

        let err = init(&path, 0, &Config::default()).unwrap_err();
        assert!(matches!(err, KvsError::InvalidSize { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn set_get_delete() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.kvs");
        let config = Config::default();
        init(&path, 4, &config).unwrap();

        set(&path, b"foo", b"bar", &config).unwrap();
        assert_eq!(get(&path, b"foo", &config).unwrap(), b"bar");

        delete(&path, b"foo", &config).unwrap();
        assert!(get(&path, b"foo", &config).unwrap_err().is_not_found());
        assert!(delete(&path, b"foo", &config).unwrap_err().is_not_found());
    }

    #[test]
    fn reserved_key_cannot_be_modified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.kvs");
        let config = Config::default();
        init(&path, 1, &config).unwrap();

        assert!(matches!(
            set(&path, METADATA_KEY, b"{}", &config),
            Err(KvsError::InvalidKey { .. })
        ));
        assert!(matches!(
            delete(&path, METADATA_KEY, &config),
            Err(KvsError::InvalidKey { .. })
        ));
        assert_eq!(
            get(&path, METADATA_KEY, &config).unwrap(),
            Metadata::current().encode().unwrap()
        );
    }

    #[test]
    fn get_on_missing_database_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.kvs");

        let err = get(&path, b"foo", &Config::default()).unwrap_err();
        assert!(matches!(err, KvsError::Storage(_)));
        assert!(!path.exists());
    }

    #[test]
    fn read_value_accepts_exact_limit() {
        let value = read_value(Cursor::new(vec![1u8; 8]), 8).unwrap();
        assert_eq!(value.len(), 8);
    }

    #[test]
    fn read_value_rejects_one_byte_over() {
        let err = read_value(Cursor::new(vec![1u8; 9]), 8).unwrap_err();
        assert!(matches!(err, KvsError::ValueTooLarge { size: 9, max: 8 }));
    }

    #[test]
    fn read_value_empty_input() {
        let value = read_value(Cursor::new(Vec::new()), 8).unwrap();
        assert!(value.is_empty());
    }
}
