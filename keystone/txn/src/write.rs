use keystone_common::Timestamp;
use keystone_storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};

use crate::lock::LockKind;

/// Outcome marker recorded in the Write column family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteKind {
    Put,
    Delete,
    /// The transaction identified by `start_ts` did not commit this key.
    Rollback,
}

impl WriteKind {
    /// The write kind a committed lock converts into. Lock-only claims leave
    /// no visible record.
    pub fn of_lock(kind: LockKind) -> Option<WriteKind> {
        match kind {
            LockKind::Put => Some(WriteKind::Put),
            LockKind::Delete => Some(WriteKind::Delete),
            LockKind::Lock => None,
        }
    }
}

/// One entry in a user key's authoritative version history.
///
/// Stored in the Write column family under `encode_key(key, commit_ts)`
/// (rollback records use the transaction's `start_ts` as the commit
/// timestamp). Once written, a record is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRecord {
    pub start_ts: Timestamp,
    pub kind: WriteKind,
}

impl WriteRecord {
    pub fn new(start_ts: Timestamp, kind: WriteKind) -> Self {
        Self { start_ts, kind }
    }

    pub fn rollback(start_ts: Timestamp) -> Self {
        Self {
            start_ts,
            kind: WriteKind::Rollback,
        }
    }

    pub fn to_bytes(&self) -> StorageResult<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|e| {
            StorageError::Corrupted(format!("write record serialization failed: {e}"))
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> StorageResult<Self> {
        postcard::from_bytes(bytes).map_err(|e| {
            StorageError::Corrupted(format!("write record deserialization failed: {e}"))
        })
    }
}
