use keystone_common::{Key, Timestamp};
use keystone_storage::{Snapshot, WriteBatch};

use crate::error::{TxnError, TxnResult};
use crate::reader::MvccReader;
use crate::txn::MvccTxn;
use crate::write::{WriteKind, WriteRecord};

/// Phase 2 of two-phase commit: make the transaction's effects visible at
/// `commit_ts`.
///
/// Committing the primary key is the durability point: once its write record
/// exists, the transaction is committed regardless of secondary-key state,
/// and secondaries can be committed later by ResolveLock.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub start_ts: Timestamp,
    pub commit_ts: Timestamp,
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone)]
pub struct CommitResponse;

pub(crate) fn process<S: Snapshot>(
    req: &CommitRequest,
    reader: &MvccReader<'_, S>,
) -> TxnResult<(CommitResponse, WriteBatch)> {
    let mut txn = MvccTxn::new(req.start_ts);
    for key in &req.keys {
        commit_key(reader, &mut txn, key, req.start_ts, req.commit_ts)?;
    }
    Ok((CommitResponse, txn.into_batch()))
}

/// Commit one key, idempotently.
pub(crate) fn commit_key<S: Snapshot>(
    reader: &MvccReader<'_, S>,
    txn: &mut MvccTxn,
    key: &[u8],
    start_ts: Timestamp,
    commit_ts: Timestamp,
) -> TxnResult<()> {
    match reader.lock(key)? {
        Some(lock) if lock.start_ts == start_ts => {
            if let Some(kind) = WriteKind::of_lock(lock.kind) {
                if kind == WriteKind::Put {
                    // Short values were carried in the lock; large values are
                    // already sitting in the Default family from prewrite.
                    if let Some(value) = lock.short_value {
                        txn.put_value(key, start_ts, value);
                    }
                }
                txn.put_write(key, commit_ts, &WriteRecord::new(start_ts, kind))?;
            }
            txn.unlock(key);
            Ok(())
        }
        // The lock belongs to a different transaction; ours left no claim.
        Some(lock) => Err(TxnError::KeyIsLocked(lock.info(key))),
        None => match reader.txn_commit_record(key, start_ts)? {
            Some((_, record)) if record.kind == WriteKind::Rollback => {
                Err(TxnError::TxnRolledBack {
                    key: key.to_vec(),
                    start_ts,
                })
            }
            // Already committed: a retry succeeds with identical state.
            Some(_) => Ok(()),
            // No lock and no trace at all: the caller violated the protocol.
            None => Err(TxnError::TxnNotFound {
                key: key.to_vec(),
                start_ts,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use keystone_storage::{Cf, Engine, MemoryEngine};

    use super::*;
    use crate::lock::{Lock, LockKind};

    #[test]
    fn committing_a_lock_only_claim_leaves_no_write_record() {
        let engine = MemoryEngine::new();
        let start_ts = Timestamp::with_ts(10);
        let lock = Lock::new(b"k".to_vec(), start_ts, 100, LockKind::Lock);
        let mut batch = WriteBatch::new();
        batch.put(Cf::Lock, b"k".to_vec(), lock.to_bytes().unwrap());
        engine.write(batch).unwrap();

        let snap = engine.snapshot().unwrap();
        let reader = MvccReader::new(&snap);
        let (_, batch) = process(
            &CommitRequest {
                start_ts,
                commit_ts: Timestamp::with_ts(11),
                keys: vec![b"k".to_vec()],
            },
            &reader,
        )
        .unwrap();
        engine.write(batch).unwrap();

        // The claim is released without leaving any trace in the history.
        assert_eq!(engine.len_cf(Cf::Lock), 0);
        assert_eq!(engine.len_cf(Cf::Write), 0);
        assert_eq!(engine.len_cf(Cf::Default), 0);
    }
}
