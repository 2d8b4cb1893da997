use keystone_common::{Key, Timestamp, Value};
use keystone_storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};

/// What the owning transaction intends to do with the locked key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockKind {
    Put,
    Delete,
    /// Lock-only: the key is claimed but no value change becomes visible.
    Lock,
}

/// A transaction's tentative claim on one user key.
///
/// Stored in the Lock column family under the *raw* user key, so there is at
/// most one outstanding lock per key. Its presence means the transaction
/// identified by `start_ts` has prewritten this key and has not yet reached a
/// terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    /// The transaction's primary key, whose state is authoritative for the
    /// whole transaction's outcome.
    pub primary: Key,
    pub start_ts: Timestamp,
    /// Lifetime in logical time units, compared against a caller-supplied
    /// `current_ts` by CheckTxnStatus.
    pub ttl: u64,
    pub kind: LockKind,
    /// Small values are carried inside the lock so commit needs no separate
    /// read of the Default family.
    pub short_value: Option<Value>,
}

impl Lock {
    pub fn new(primary: Key, start_ts: Timestamp, ttl: u64, kind: LockKind) -> Self {
        Self {
            primary,
            start_ts,
            ttl,
            kind,
            short_value: None,
        }
    }

    /// A lock blocks a read at `read_ts` iff it belongs to a transaction that
    /// started at or before the read. Locks from future transactions are
    /// invisible.
    pub fn is_blocking(&self, read_ts: Timestamp) -> bool {
        self.start_ts <= read_ts
    }

    /// Whether the lock's ttl has been exceeded as of `current_ts`.
    pub fn is_expired(&self, current_ts: Timestamp) -> bool {
        current_ts.elapsed_since(self.start_ts) > self.ttl
    }

    /// The conflict payload reported to callers blocked by this lock.
    pub fn info(&self, key: &[u8]) -> LockInfo {
        LockInfo {
            key: key.to_vec(),
            primary: self.primary.clone(),
            start_ts: self.start_ts,
            ttl: self.ttl,
        }
    }

    pub fn to_bytes(&self) -> StorageResult<Vec<u8>> {
        postcard::to_allocvec(self)
            .map_err(|e| StorageError::Corrupted(format!("lock serialization failed: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> StorageResult<Self> {
        postcard::from_bytes(bytes)
            .map_err(|e| StorageError::Corrupted(format!("lock deserialization failed: {e}")))
    }
}

/// Description of a blocking lock, carried by lock-conflict errors and by
/// ScanLock results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    pub key: Key,
    pub primary: Key,
    pub start_ts: Timestamp,
    pub ttl: u64,
}
