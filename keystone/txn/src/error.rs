use keystone_common::{Key, Timestamp};
use keystone_storage::StorageError;
use thiserror::Error;

use crate::lock::LockInfo;

pub type TxnResult<T> = Result<T, TxnError>;

/// Errors surfaced by the transactional command layer.
///
/// Lock and conflict errors are recoverable: the caller resolves the blocking
/// transaction (or restarts with a fresh `start_ts`) and retries. Structural
/// errors abort the whole command.
#[derive(Error, Debug)]
pub enum TxnError {
    /// The key holds another transaction's outstanding lock. Retry after
    /// resolving it via CheckTxnStatus / ResolveLock.
    #[error("key {:?} is locked by transaction {:?} (primary {:?})", .0.key, .0.start_ts, .0.primary)]
    KeyIsLocked(LockInfo),

    /// Prewrite lost a first-committer race: another transaction committed
    /// this key at or after our `start_ts`.
    #[error(
        "write conflict on key {key:?}: transaction {conflict_start_ts:?} committed at \
         {conflict_commit_ts:?}, which is not before our start {start_ts:?}"
    )]
    WriteConflict {
        key: Key,
        start_ts: Timestamp,
        conflict_start_ts: Timestamp,
        conflict_commit_ts: Timestamp,
    },

    /// Commit found neither a lock nor any trace of the transaction.
    #[error("transaction {start_ts:?} not found on key {key:?}")]
    TxnNotFound { key: Key, start_ts: Timestamp },

    /// Commit found a rollback record for this transaction.
    #[error("transaction {start_ts:?} was rolled back on key {key:?}")]
    TxnRolledBack { key: Key, start_ts: Timestamp },

    /// Rollback found the transaction already committed.
    #[error(
        "transaction {start_ts:?} already committed key {key:?} at {commit_ts:?}, cannot roll back"
    )]
    AlreadyCommitted {
        key: Key,
        start_ts: Timestamp,
        commit_ts: Timestamp,
    },

    /// Caller programming error, surfaced immediately and never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Substrate failure; retryable, no partial state is left visible.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TxnError {
    /// True for the per-key protocol errors that are collected into command
    /// responses rather than aborting the whole batch.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            TxnError::KeyIsLocked(_)
                | TxnError::WriteConflict { .. }
                | TxnError::TxnNotFound { .. }
                | TxnError::TxnRolledBack { .. }
                | TxnError::AlreadyCommitted { .. }
        )
    }
}
