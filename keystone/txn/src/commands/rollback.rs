use keystone_common::{Key, Timestamp};
use keystone_storage::{Snapshot, WriteBatch};

use crate::error::{TxnError, TxnResult};
use crate::lock::LockKind;
use crate::reader::MvccReader;
use crate::txn::MvccTxn;
use crate::write::{WriteKind, WriteRecord};

/// Roll back a transaction's claim on a single key (typically issued by a
/// reader that found an abandoned lock).
#[derive(Debug, Clone)]
pub struct CleanupRequest {
    pub key: Key,
    pub start_ts: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CleanupResponse;

pub(crate) fn process_cleanup<S: Snapshot>(
    req: &CleanupRequest,
    reader: &MvccReader<'_, S>,
) -> TxnResult<(CleanupResponse, WriteBatch)> {
    let mut txn = MvccTxn::new(req.start_ts);
    rollback_key(reader, &mut txn, &req.key, req.start_ts)?;
    Ok((CleanupResponse, txn.into_batch()))
}

/// Roll back a transaction on every listed key.
#[derive(Debug, Clone)]
pub struct BatchRollbackRequest {
    pub start_ts: Timestamp,
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone)]
pub struct BatchRollbackResponse;

pub(crate) fn process_batch<S: Snapshot>(
    req: &BatchRollbackRequest,
    reader: &MvccReader<'_, S>,
) -> TxnResult<(BatchRollbackResponse, WriteBatch)> {
    let mut txn = MvccTxn::new(req.start_ts);
    for key in &req.keys {
        rollback_key(reader, &mut txn, key, req.start_ts)?;
    }
    Ok((BatchRollbackResponse, txn.into_batch()))
}

/// Roll back one key, idempotently.
///
/// If the transaction never touched the key, a rollback record is written
/// anyway so that a late prewrite from the same `start_ts` can never succeed:
/// rollback wins the race.
pub(crate) fn rollback_key<S: Snapshot>(
    reader: &MvccReader<'_, S>,
    txn: &mut MvccTxn,
    key: &[u8],
    start_ts: Timestamp,
) -> TxnResult<()> {
    match reader.lock(key)? {
        Some(lock) if lock.start_ts == start_ts => {
            // Discard the prewritten value unless it was inlined in the lock.
            if lock.kind == LockKind::Put && lock.short_value.is_none() {
                txn.delete_value(key, start_ts);
            }
            txn.put_write(key, start_ts, &WriteRecord::rollback(start_ts))?;
            txn.unlock(key);
            Ok(())
        }
        // No lock, or a lock owned by some other transaction (which stays
        // untouched). The write history decides.
        _ => match reader.txn_commit_record(key, start_ts)? {
            Some((_, record)) if record.kind == WriteKind::Rollback => Ok(()),
            Some((commit_ts, _)) => Err(TxnError::AlreadyCommitted {
                key: key.to_vec(),
                start_ts,
                commit_ts,
            }),
            None => {
                txn.put_write(key, start_ts, &WriteRecord::rollback(start_ts))?;
                Ok(())
            }
        },
    }
}
