use keystone_common::{Key, Timestamp, Value};
use keystone_storage::{Cf, Snapshot, StorageResult};

use crate::codec::{decode_ts, encode_bytes, encode_key, user_key};
use crate::error::{TxnError, TxnResult};
use crate::lock::Lock;
use crate::write::{WriteKind, WriteRecord};

/// Point-in-time reader over the multi-version column families.
///
/// All reads go through one snapshot, so a command observes a single
/// consistent view for its whole duration.
pub struct MvccReader<'a, S: Snapshot> {
    snap: &'a S,
}

impl<'a, S: Snapshot> MvccReader<'a, S> {
    pub fn new(snap: &'a S) -> Self {
        Self { snap }
    }

    /// The outstanding lock on `key`, if any.
    pub fn lock(&self, key: &[u8]) -> StorageResult<Option<Lock>> {
        match self.snap.get_cf(Cf::Lock, key)? {
            Some(bytes) => Ok(Some(Lock::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The newest write record for `key` with `commit_ts <= ts`.
    pub fn seek_write(
        &self,
        key: &[u8],
        ts: Timestamp,
    ) -> StorageResult<Option<(Timestamp, WriteRecord)>> {
        let seek = encode_key(key, ts);
        if let Some((encoded, value)) = self.snap.iter_cf(Cf::Write, &seek)?.next() {
            if user_key(&encoded)? == key {
                let commit_ts = decode_ts(&encoded)?;
                return Ok(Some((commit_ts, WriteRecord::from_bytes(&value)?)));
            }
        }
        Ok(None)
    }

    /// The write record produced by the transaction `start_ts` on `key`, if
    /// that transaction ever reached an outcome here. Used for idempotence
    /// and status checks.
    ///
    /// Records are ordered by descending commit timestamp and every record
    /// satisfies `commit_ts >= start_ts`, so the walk stops as soon as the
    /// commit timestamps drop below the transaction's start.
    pub fn txn_commit_record(
        &self,
        key: &[u8],
        start_ts: Timestamp,
    ) -> StorageResult<Option<(Timestamp, WriteRecord)>> {
        let seek = encode_key(key, Timestamp::MAX);
        for (encoded, value) in self.snap.iter_cf(Cf::Write, &seek)? {
            if user_key(&encoded)? != key {
                break;
            }
            let commit_ts = decode_ts(&encoded)?;
            if commit_ts < start_ts {
                break;
            }
            let record = WriteRecord::from_bytes(&value)?;
            if record.start_ts == start_ts {
                return Ok(Some((commit_ts, record)));
            }
        }
        Ok(None)
    }

    /// The value prewritten or committed by transaction `start_ts` on `key`.
    pub fn value(&self, key: &[u8], start_ts: Timestamp) -> StorageResult<Option<Value>> {
        self.snap.get_cf(Cf::Default, &encode_key(key, start_ts))
    }

    /// Snapshot read of `key` at `ts`, failing if an in-progress transaction
    /// blocks it.
    pub fn get(&self, key: &[u8], ts: Timestamp) -> TxnResult<Option<Value>> {
        if let Some(lock) = self.lock(key)? {
            if lock.is_blocking(ts) {
                return Err(TxnError::KeyIsLocked(lock.info(key)));
            }
        }
        self.get_committed(key, ts)
    }

    /// The committed-history part of the read path: resolve the newest write
    /// record at or below `ts` without consulting the Lock family.
    pub fn get_committed(&self, key: &[u8], ts: Timestamp) -> TxnResult<Option<Value>> {
        match self.seek_write(key, ts)? {
            Some((_, record)) => match record.kind {
                WriteKind::Put => Ok(self.value(key, record.start_ts)?),
                WriteKind::Delete | WriteKind::Rollback => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// The smallest user key at or after `from` that has any write record.
    /// The key encoding is prefix-free, so the first entry at or after the
    /// encoded seek point belongs to the answer.
    pub fn next_write_key(&self, from: &[u8]) -> StorageResult<Option<Key>> {
        let seek = encode_bytes(from);
        match self.snap.iter_cf(Cf::Write, &seek)?.next() {
            Some((encoded, _)) => Ok(Some(user_key(&encoded)?)),
            None => Ok(None),
        }
    }

    /// The smallest locked user key at or after `from`.
    pub fn next_lock_key(&self, from: &[u8]) -> StorageResult<Option<Key>> {
        Ok(self
            .snap
            .iter_cf(Cf::Lock, from)?
            .next()
            .map(|(key, _)| key))
    }

    /// All locks with `start_ts <= max_ts`, in key order, bounded by `limit`
    /// (0 means unbounded).
    pub fn scan_locks(&self, max_ts: Timestamp, limit: usize) -> StorageResult<Vec<(Key, Lock)>> {
        let mut locks = Vec::new();
        for (key, value) in self.snap.iter_cf(Cf::Lock, b"")? {
            let lock = Lock::from_bytes(&value)?;
            if lock.start_ts <= max_ts {
                locks.push((key, lock));
                if limit != 0 && locks.len() >= limit {
                    break;
                }
            }
        }
        Ok(locks)
    }
}
