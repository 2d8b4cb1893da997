use keystone_common::{Key, Timestamp};
use keystone_storage::{Snapshot, WriteBatch};

use crate::commands::commit::commit_key;
use crate::commands::rollback::rollback_key;
use crate::error::TxnResult;
use crate::reader::MvccReader;
use crate::txn::MvccTxn;

/// Apply an already-determined transaction outcome to its secondary keys.
///
/// The outcome is typically obtained via CheckTxnStatus on the primary.
/// Every listed key still holding a lock at `start_ts` is committed (when
/// `commit_ts` is set) or rolled back; keys the transaction no longer holds
/// are skipped.
#[derive(Debug, Clone)]
pub struct ResolveLockRequest {
    pub start_ts: Timestamp,
    /// `Some(commit_ts)` commits, `None` rolls back.
    pub commit_ts: Option<Timestamp>,
    /// Keys to resolve. Empty means "every key currently locked by
    /// `start_ts`", discovered by scanning the Lock family.
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone)]
pub struct ResolveLockResponse {
    /// Number of locks actually resolved.
    pub resolved: usize,
}

pub(crate) fn process<S: Snapshot>(
    req: &ResolveLockRequest,
    keys: &[Key],
    reader: &MvccReader<'_, S>,
) -> TxnResult<(ResolveLockResponse, WriteBatch)> {
    let mut txn = MvccTxn::new(req.start_ts);
    let mut resolved = 0;
    for key in keys {
        match reader.lock(key)? {
            Some(lock) if lock.start_ts == req.start_ts => {
                match req.commit_ts {
                    Some(commit_ts) => {
                        commit_key(reader, &mut txn, key, req.start_ts, commit_ts)?
                    }
                    None => rollback_key(reader, &mut txn, key, req.start_ts)?,
                }
                resolved += 1;
            }
            // Already resolved by someone else, or claimed by a different
            // transaction: leave it alone.
            _ => {}
        }
    }
    Ok((ResolveLockResponse { resolved }, txn.into_batch()))
}
