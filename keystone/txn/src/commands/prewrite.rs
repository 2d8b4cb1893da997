use keystone_common::{Key, Timestamp, Value};
use keystone_storage::{Snapshot, WriteBatch};

use crate::config::SchedulerConfig;
use crate::error::{TxnError, TxnResult};
use crate::lock::{Lock, LockKind};
use crate::reader::MvccReader;
use crate::txn::MvccTxn;

/// A per-key tentative change carried by a prewrite.
#[derive(Debug, Clone)]
pub enum Mutation {
    Put { key: Key, value: Value },
    Delete { key: Key },
}

impl Mutation {
    pub fn key(&self) -> &[u8] {
        match self {
            Mutation::Put { key, .. } => key,
            Mutation::Delete { key } => key,
        }
    }

    fn lock_kind(&self) -> LockKind {
        match self {
            Mutation::Put { .. } => LockKind::Put,
            Mutation::Delete { .. } => LockKind::Delete,
        }
    }
}

/// Phase 1 of two-phase commit: claim every key of the transaction.
#[derive(Debug, Clone)]
pub struct PrewriteRequest {
    pub start_ts: Timestamp,
    pub mutations: Vec<Mutation>,
    /// The key whose lock/write state is authoritative for the whole
    /// transaction's outcome. Must be one of the mutation keys.
    pub primary: Key,
    pub ttl: u64,
}

#[derive(Debug)]
pub struct PrewriteResponse {
    /// Per-key conflicts. Empty means every key now holds a lock owned by
    /// `start_ts`; non-empty means no lock was written at all.
    pub key_errors: Vec<TxnError>,
}

impl PrewriteResponse {
    pub fn is_ok(&self) -> bool {
        self.key_errors.is_empty()
    }
}

pub(crate) fn process<S: Snapshot>(
    req: &PrewriteRequest,
    reader: &MvccReader<'_, S>,
    config: &SchedulerConfig,
) -> TxnResult<(PrewriteResponse, WriteBatch)> {
    // Validate every key before writing anything: a batch with any conflict
    // writes no locks.
    let mut key_errors = Vec::new();
    for mutation in &req.mutations {
        let key = mutation.key();
        if let Some((commit_ts, record)) = reader.seek_write(key, Timestamp::MAX)? {
            // First-committer-wins: any record at or after our start loses us
            // the race. This also covers rollback records left at our own
            // start_ts, so "rollback wins" over a late prewrite.
            if commit_ts >= req.start_ts {
                key_errors.push(TxnError::WriteConflict {
                    key: key.to_vec(),
                    start_ts: req.start_ts,
                    conflict_start_ts: record.start_ts,
                    conflict_commit_ts: commit_ts,
                });
                continue;
            }
        }
        if let Some(lock) = reader.lock(key)? {
            key_errors.push(TxnError::KeyIsLocked(lock.info(key)));
        }
    }
    if !key_errors.is_empty() {
        return Ok((PrewriteResponse { key_errors }, WriteBatch::new()));
    }

    let mut txn = MvccTxn::new(req.start_ts);
    for mutation in &req.mutations {
        let mut lock = Lock::new(
            req.primary.clone(),
            req.start_ts,
            req.ttl,
            mutation.lock_kind(),
        );
        if let Mutation::Put { key, value } = mutation {
            if value.len() <= config.short_value_limit {
                lock.short_value = Some(value.clone());
            } else {
                txn.put_value(key, req.start_ts, value.clone());
            }
        }
        txn.put_lock(mutation.key(), &lock)?;
    }
    Ok((PrewriteResponse { key_errors }, txn.into_batch()))
}
