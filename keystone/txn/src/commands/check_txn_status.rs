use keystone_common::{Key, Timestamp};
use keystone_storage::{Snapshot, WriteBatch};

use crate::commands::rollback::rollback_key;
use crate::error::TxnResult;
use crate::reader::MvccReader;
use crate::txn::MvccTxn;
use crate::write::{WriteKind, WriteRecord};

/// Determine the authoritative outcome of a transaction from its primary
/// key, without requiring the original client to be alive.
#[derive(Debug, Clone)]
pub struct CheckTxnStatusRequest {
    pub primary: Key,
    /// The transaction's `start_ts`.
    pub lock_ts: Timestamp,
    /// The caller's view of now, used for the ttl comparison.
    pub current_ts: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CheckTxnStatusResponse {
    pub status: TxnStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnStatus {
    Committed { commit_ts: Timestamp },
    RolledBack,
    /// Still in progress; back off and retry after the remaining ttl.
    Locked { ttl_remaining: u64 },
}

pub(crate) fn process<S: Snapshot>(
    req: &CheckTxnStatusRequest,
    reader: &MvccReader<'_, S>,
) -> TxnResult<(CheckTxnStatusResponse, WriteBatch)> {
    let mut txn = MvccTxn::new(req.lock_ts);
    let status = match reader.lock(&req.primary)? {
        Some(lock) if lock.start_ts == req.lock_ts => {
            if lock.is_expired(req.current_ts) {
                // Abandoned: whoever notices first resolves it.
                rollback_key(reader, &mut txn, &req.primary, req.lock_ts)?;
                TxnStatus::RolledBack
            } else {
                let elapsed = req.current_ts.elapsed_since(req.lock_ts);
                TxnStatus::Locked {
                    ttl_remaining: lock.ttl - elapsed,
                }
            }
        }
        // No lock owned by this transaction: the write history decides, and
        // a transaction with no trace at all is recorded as rolled back so a
        // future prewrite at this start_ts is rejected.
        _ => match reader.txn_commit_record(&req.primary, req.lock_ts)? {
            Some((commit_ts, record)) if record.kind != WriteKind::Rollback => {
                TxnStatus::Committed { commit_ts }
            }
            Some(_) => TxnStatus::RolledBack,
            None => {
                txn.put_write(
                    &req.primary,
                    req.lock_ts,
                    &WriteRecord::rollback(req.lock_ts),
                )?;
                TxnStatus::RolledBack
            }
        },
    };
    Ok((CheckTxnStatusResponse { status }, txn.into_batch()))
}
