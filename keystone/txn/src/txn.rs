use keystone_common::{Key, Timestamp, Value};
use keystone_storage::{Cf, StorageResult, WriteBatch};

use crate::codec::encode_key;
use crate::lock::Lock;
use crate::write::WriteRecord;

/// Write-side buffer for one command execution.
///
/// Commands stage their mutations here; nothing becomes visible until the
/// scheduler applies the finished batch atomically. Deletes are staged after
/// the puts that supersede them, so a concurrent reader of the live engine
/// never observes a key whose lock vanished before its write record appeared.
pub struct MvccTxn {
    start_ts: Timestamp,
    batch: WriteBatch,
}

impl MvccTxn {
    pub fn new(start_ts: Timestamp) -> Self {
        Self {
            start_ts,
            batch: WriteBatch::new(),
        }
    }

    pub fn start_ts(&self) -> Timestamp {
        self.start_ts
    }

    /// Stage a lock on `key`.
    pub fn put_lock(&mut self, key: &[u8], lock: &Lock) -> StorageResult<()> {
        self.batch.put(Cf::Lock, key.to_vec(), lock.to_bytes()?);
        Ok(())
    }

    /// Stage removal of the lock on `key`.
    pub fn unlock(&mut self, key: &[u8]) {
        self.batch.delete(Cf::Lock, key.to_vec());
    }

    /// Stage a value at version `ts` in the Default family.
    pub fn put_value(&mut self, key: &[u8], ts: Timestamp, value: Value) {
        self.batch.put(Cf::Default, encode_key(key, ts), value);
    }

    /// Stage removal of the value at version `ts`.
    pub fn delete_value(&mut self, key: &[u8], ts: Timestamp) {
        self.batch.delete(Cf::Default, encode_key(key, ts));
    }

    /// Stage a write record at `commit_ts` in the Write family.
    pub fn put_write(
        &mut self,
        key: &[u8],
        commit_ts: Timestamp,
        record: &WriteRecord,
    ) -> StorageResult<()> {
        self.batch
            .put(Cf::Write, encode_key(key, commit_ts), record.to_bytes()?);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn into_batch(self) -> WriteBatch {
        self.batch
    }
}
