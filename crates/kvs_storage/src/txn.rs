//! Engine transactions.

use crate::environment::Table;
use crate::error::{StorageError, StorageResult, TxnOp};
use heed::{RoTxn, RwTxn};
use tracing::{debug, trace};

/// A live LMDB transaction against an environment's table.
///
/// The mode is fixed when the transaction starts. Dropping the value without
/// calling [`EngineTxn::commit`] aborts it, so pending writes are never
/// applied by accident.
pub struct EngineTxn<'env> {
    table: Table,
    inner: TxnInner<'env>,
}

#[allow(clippy::large_enum_variant)]
enum TxnInner<'env> {
    Read(RoTxn<'env>),
    Write(RwTxn<'env>),
}

impl<'env> EngineTxn<'env> {
    pub(crate) fn read(table: Table, txn: RoTxn<'env>) -> Self {
        Self {
            table,
            inner: TxnInner::Read(txn),
        }
    }

    pub(crate) fn write(table: Table, txn: RwTxn<'env>) -> Self {
        Self {
            table,
            inner: TxnInner::Write(txn),
        }
    }

    /// Returns true if this transaction cannot write.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self.inner, TxnInner::Read(_))
    }

    fn ro(&self) -> &RoTxn<'env> {
        match &self.inner {
            TxnInner::Read(txn) => txn,
            TxnInner::Write(txn) => &**txn,
        }
    }

    /// Looks up `key`, copying the stored bytes out of the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine lookup fails.
    pub fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let value = self.table.get(self.ro(), key)?;
        trace!(key_len = key.len(), found = value.is_some(), "engine get");
        Ok(value.map(<[u8]>::to_vec))
    }

    /// Inserts or overwrites the record for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] for read transactions, or an
    /// engine error (for example when the map is full).
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        match &mut self.inner {
            TxnInner::Read(_) => Err(StorageError::ReadOnly),
            TxnInner::Write(txn) => {
                self.table.put(txn, key, value)?;
                trace!(key_len = key.len(), value_len = value.len(), "engine put");
                Ok(())
            }
        }
    }

    /// Removes the record for `key`.
    ///
    /// Returns `false` if there was no such record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] for read transactions, or an
    /// engine error.
    pub fn delete(&mut self, key: &[u8]) -> StorageResult<bool> {
        match &mut self.inner {
            TxnInner::Read(_) => Err(StorageError::ReadOnly),
            TxnInner::Write(txn) => {
                let deleted = self.table.delete(txn, key)?;
                trace!(key_len = key.len(), deleted, "engine delete");
                Ok(deleted)
            }
        }
    }

    /// Returns the number of records in the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot read the table statistics.
    pub fn entries(&self) -> StorageResult<u64> {
        Ok(self.table.len(self.ro())?)
    }

    /// Commits the transaction.
    ///
    /// For a write transaction this makes every put and delete durable and
    /// visible at once. For a read transaction it only releases the
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the engine rejects the
    /// commit. The transaction is consumed either way.
    pub fn commit(self) -> StorageResult<()> {
        let result = match self.inner {
            TxnInner::Read(txn) => txn.commit(),
            TxnInner::Write(txn) => txn.commit(),
        };
        result.map_err(|e| StorageError::transaction(TxnOp::Commit, e))?;
        debug!("transaction committed");
        Ok(())
    }

    /// Aborts the transaction, discarding all pending writes.
    pub fn abort(self) {
        match self.inner {
            TxnInner::Read(txn) => drop(txn),
            TxnInner::Write(txn) => txn.abort(),
        }
        debug!("transaction aborted");
    }
}

impl std::fmt::Debug for EngineTxn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineTxn")
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
