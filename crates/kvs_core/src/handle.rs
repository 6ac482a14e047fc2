//! Database handles and their transaction state machine.

use crate::error::{KvsError, KvsResult};
use crate::metadata::{Metadata, METADATA_KEY};
use kvs_storage::{EngineTxn, MAX_KEY_SIZE};
use tracing::{debug, trace};

/// Lifecycle state of a [`Handle`].
///
/// ```text
/// Active ──commit──▶ Committed ──┐
///    │                           ├──close──▶ Closed
///    └────abort────▶ Aborted ────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// A transaction is live and accepts operations.
    Active,
    /// The transaction was committed.
    Committed,
    /// The transaction was aborted, or its commit failed.
    Aborted,
    /// The handle has been closed. Terminal.
    Closed,
}

/// The live transaction of an open [`Database`](crate::Database).
///
/// A handle holds at most one engine transaction. Record operations run
/// against it until [`Handle::commit`] or [`Handle::abort`] empties the
/// slot. Dropping a handle closes it, which aborts any transaction still
/// live: writes are applied only by an explicit, successful commit.
#[derive(Debug)]
pub struct Handle<'env> {
    txn: Option<EngineTxn<'env>>,
    state: HandleState,
    max_value_size: usize,
}

impl<'env> Handle<'env> {
    pub(crate) fn new(txn: EngineTxn<'env>, max_value_size: usize) -> Self {
        Self {
            txn: Some(txn),
            state: HandleState::Active,
            max_value_size,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Returns true while a transaction is live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.txn.is_some()
    }

    /// Returns true if the live transaction cannot write.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.txn.as_ref().is_some_and(EngineTxn::is_read_only)
    }

    /// Looks up the value stored under `key`.
    ///
    /// # Errors
    ///
    /// - [`KvsError::NotFound`] if there is no such record
    /// - [`KvsError::InvalidOperation`] if no transaction is live
    pub fn get(&self, key: &[u8]) -> KvsResult<Vec<u8>> {
        let txn = self.txn()?;
        validate_key(key)?;
        txn.get(key)?.ok_or_else(|| KvsError::not_found(key))
    }

    /// Inserts or overwrites the record for `key`.
    ///
    /// The value size is checked before the engine is touched.
    ///
    /// # Errors
    ///
    /// - [`KvsError::ValueTooLarge`] if `value` exceeds the maximum size
    /// - [`KvsError::ReadOnly`] for a read-only handle
    /// - [`KvsError::Storage`] if the engine rejects the write
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> KvsResult<()> {
        let max = self.max_value_size;
        let txn = self.writable_txn()?;
        validate_key(key)?;
        if value.len() > max {
            return Err(KvsError::ValueTooLarge {
                size: value.len(),
                max,
            });
        }
        txn.put(key, value)?;
        Ok(())
    }

    /// Removes the record for `key`.
    ///
    /// # Errors
    ///
    /// - [`KvsError::NotFound`] if there is no such record
    /// - [`KvsError::ReadOnly`] for a read-only handle
    pub fn delete(&mut self, key: &[u8]) -> KvsResult<()> {
        let txn = self.writable_txn()?;
        validate_key(key)?;
        if txn.delete(key)? {
            Ok(())
        } else {
            Err(KvsError::not_found(key))
        }
    }

    /// Reads and validates the metadata record, if the database has one.
    ///
    /// # Errors
    ///
    /// Returns [`KvsError::Metadata`] or [`KvsError::Json`] if the record
    /// exists but cannot be understood.
    pub fn metadata(&self) -> KvsResult<Option<Metadata>> {
        match self.get(METADATA_KEY) {
            Ok(bytes) => Metadata::decode(&bytes).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns the number of records visible to the live transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no transaction is live or the engine fails.
    pub fn entries(&self) -> KvsResult<u64> {
        Ok(self.txn()?.entries()?)
    }

    /// Commits the live transaction.
    ///
    /// On success every put and delete becomes durable and visible at once.
    /// The transaction slot is empty afterwards whether or not the commit
    /// succeeded; a failed commit leaves the handle `Aborted`, and it must
    /// still be closed.
    ///
    /// # Errors
    ///
    /// - [`KvsError::InvalidOperation`] if no transaction is live
    /// - [`KvsError::Storage`] if the engine rejects the commit
    pub fn commit(&mut self) -> KvsResult<()> {
        self.ensure_active()?;
        let Some(txn) = self.txn.take() else {
            return Err(KvsError::invalid_operation("no live transaction"));
        };

        match txn.commit() {
            Ok(()) => {
                self.state = HandleState::Committed;
                Ok(())
            }
            Err(e) => {
                self.state = HandleState::Aborted;
                Err(e.into())
            }
        }
    }

    /// Discards the live transaction and all of its pending writes.
    ///
    /// Does nothing when no transaction is live.
    pub fn abort(&mut self) {
        if let Some(txn) = self.txn.take() {
            txn.abort();
            self.state = HandleState::Aborted;
        }
    }

    /// Aborts any live transaction and closes the handle.
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        if self.state == HandleState::Closed {
            return;
        }
        self.abort();
        self.state = HandleState::Closed;
        debug!("handle closed");
    }

    fn ensure_active(&self) -> KvsResult<()> {
        match self.state {
            HandleState::Active => Ok(()),
            HandleState::Committed => Err(KvsError::invalid_operation(
                "transaction already committed",
            )),
            HandleState::Aborted => Err(KvsError::invalid_operation("transaction already aborted")),
            HandleState::Closed => Err(KvsError::invalid_operation("handle is closed")),
        }
    }

    fn txn(&self) -> KvsResult<&EngineTxn<'env>> {
        self.ensure_active()?;
        self.txn
            .as_ref()
            .ok_or_else(|| KvsError::invalid_operation("no live transaction"))
    }

    fn writable_txn(&mut self) -> KvsResult<&mut EngineTxn<'env>> {
        self.ensure_active()?;
        match self.txn.as_mut() {
            Some(txn) if txn.is_read_only() => Err(KvsError::ReadOnly),
            Some(txn) => Ok(txn),
            None => Err(KvsError::invalid_operation("no live transaction")),
        }
    }
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Checks that `key` is non-empty and within the engine's key limit.
pub(crate) fn validate_key(key: &[u8]) -> KvsResult<()> {
    if key.is_empty() {
        return Err(KvsError::invalid_key("key must not be empty"));
    }
    if key.len() > MAX_KEY_SIZE {
        return Err(KvsError::invalid_key(format!(
            "key is {} bytes, maximum is {MAX_KEY_SIZE}",
            key.len()
        )));
    }
    trace!(key_len = key.len(), "key ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessMode, Config, Database};
    use tempfile::{tempdir, TempDir};

    fn open(mode: AccessMode, config: &Config) -> (TempDir, Database) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.kvs");
        if mode.is_read_only() {
            drop(Database::open(&path, AccessMode::ReadWrite, config).unwrap());
        }
        let db = Database::open(&path, mode, config).unwrap();
        (dir, db)
    }

    fn config() -> Config {
        Config::new().map_size(4 * 1024 * 1024)
    }

    #[test]
    fn new_handle_is_active() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let handle = db.begin().unwrap();
        assert_eq!(handle.state(), HandleState::Active);
        assert!(handle.is_active());
        assert!(!handle.is_read_only());
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let handle = db.begin().unwrap();
        assert!(handle.get(b"missing").unwrap_err().is_not_found());
    }

    #[test]
    fn put_is_visible_within_transaction() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        handle.put(b"foo", b"bar").unwrap();
        assert_eq!(handle.get(b"foo").unwrap(), b"bar");
        assert_eq!(handle.entries().unwrap(), 1);
    }

    #[test]
    fn put_overwrites_previous() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        handle.put(b"foo", b"one").unwrap();
        handle.put(b"foo", b"two").unwrap();
        assert_eq!(handle.get(b"foo").unwrap(), b"two");
        assert_eq!(handle.entries().unwrap(), 1);
    }

    #[test]
    fn commit_empties_transaction_slot() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        handle.put(b"foo", b"bar").unwrap();
        handle.commit().unwrap();

        assert_eq!(handle.state(), HandleState::Committed);
        assert!(!handle.is_active());
        assert!(matches!(
            handle.get(b"foo"),
            Err(KvsError::InvalidOperation { .. })
        ));
        assert!(matches!(
            handle.commit(),
            Err(KvsError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn abort_discards_writes() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        handle.put(b"foo", b"bar").unwrap();
        handle.abort();
        assert_eq!(handle.state(), HandleState::Aborted);
        drop(handle);

        let handle = db.begin().unwrap();
        assert!(handle.get(b"foo").unwrap_err().is_not_found());
    }

    #[test]
    fn abort_is_idempotent() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        handle.abort();
        handle.abort();
        assert_eq!(handle.state(), HandleState::Aborted);
    }

    #[test]
    fn abort_after_commit_keeps_committed_state() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        handle.commit().unwrap();
        handle.abort();
        assert_eq!(handle.state(), HandleState::Committed);
    }

    #[test]
    fn close_twice_is_safe() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        handle.put(b"foo", b"bar").unwrap();
        handle.close();
        handle.close();
        assert_eq!(handle.state(), HandleState::Closed);
        assert!(matches!(
            handle.put(b"foo", b"bar"),
            Err(KvsError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn dropped_handle_applies_nothing() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        {
            let mut handle = db.begin().unwrap();
            handle.put(b"foo", b"bar").unwrap();
        }
        let handle = db.begin().unwrap();
        assert!(handle.get(b"foo").unwrap_err().is_not_found());
    }

    #[test]
    fn read_only_handle_rejects_writes() {
        let (_dir, db) = open(AccessMode::ReadOnly, &config());
        let mut handle = db.begin().unwrap();
        assert!(handle.is_read_only());
        assert!(matches!(handle.put(b"foo", b"bar"), Err(KvsError::ReadOnly)));
        assert!(matches!(handle.delete(b"foo"), Err(KvsError::ReadOnly)));
    }

    #[test]
    fn value_size_boundary() {
        let config = config().max_value_size(16);
        let (_dir, db) = open(AccessMode::ReadWrite, &config);
        let mut handle = db.begin().unwrap();

        handle.put(b"exact", &[7u8; 16]).unwrap();
        let err = handle.put(b"over", &[7u8; 17]).unwrap_err();
        assert!(matches!(err, KvsError::ValueTooLarge { size: 17, max: 16 }));
        assert!(handle.get(b"over").unwrap_err().is_not_found());
        assert_eq!(handle.entries().unwrap(), 1);
    }

    #[test]
    fn keys_are_validated() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();

        assert!(matches!(
            handle.put(b"", b"v"),
            Err(KvsError::InvalidKey { .. })
        ));
        let long = vec![b'k'; MAX_KEY_SIZE + 1];
        assert!(matches!(handle.get(&long), Err(KvsError::InvalidKey { .. })));

        let longest = vec![b'k'; MAX_KEY_SIZE];
        handle.put(&longest, b"v").unwrap();
        assert_eq!(handle.get(&longest).unwrap(), b"v");
    }

    #[test]
    fn delete_missing_is_not_found() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let mut handle = db.begin().unwrap();
        assert!(handle.delete(b"missing").unwrap_err().is_not_found());
    }

    #[test]
    fn metadata_absent_on_fresh_database() {
        let (_dir, db) = open(AccessMode::ReadWrite, &config());
        let handle = db.begin().unwrap();
        assert_eq!(handle.metadata().unwrap(), None);
    }
}
