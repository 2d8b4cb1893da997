//! The command set: one unit per RPC verb.
//!
//! Each command is a typed request; the closed [`Command`] enum maps a verb
//! to its handler and is matched exhaustively by the scheduler, so adding a
//! verb without handling it is a compile error.

pub mod check_txn_status;
pub mod commit;
pub mod get;
pub mod prewrite;
pub mod raw;
pub mod resolve_lock;
pub mod rollback;
pub mod scan;
pub mod scan_lock;

pub use check_txn_status::{CheckTxnStatusRequest, CheckTxnStatusResponse, TxnStatus};
pub use commit::{CommitRequest, CommitResponse};
pub use get::{BatchGetRequest, BatchGetResponse, GetRequest, GetResponse};
pub use prewrite::{Mutation, PrewriteRequest, PrewriteResponse};
pub use raw::{
    RawDeleteRequest, RawDeleteResponse, RawGetRequest, RawGetResponse, RawPutRequest,
    RawPutResponse, RawScanRequest, RawScanResponse,
};
pub use resolve_lock::{ResolveLockRequest, ResolveLockResponse};
pub use rollback::{BatchRollbackRequest, BatchRollbackResponse, CleanupRequest, CleanupResponse};
pub use scan::{KvPair, ScanRequest, ScanResponse};
pub use scan_lock::{ScanLockRequest, ScanLockResponse};

use keystone_common::Key;

/// A decoded client request, one variant per verb.
#[derive(Debug, Clone)]
pub enum Command {
    Get(GetRequest),
    BatchGet(BatchGetRequest),
    Scan(ScanRequest),
    Prewrite(PrewriteRequest),
    Commit(CommitRequest),
    Cleanup(CleanupRequest),
    BatchRollback(BatchRollbackRequest),
    CheckTxnStatus(CheckTxnStatusRequest),
    ScanLock(ScanLockRequest),
    ResolveLock(ResolveLockRequest),
    RawGet(RawGetRequest),
    RawPut(RawPutRequest),
    RawDelete(RawDeleteRequest),
    RawScan(RawScanRequest),
}

impl Command {
    /// The keys this command must hold latched while it executes. Pure reads
    /// and raw single-operation commands declare none.
    pub fn latch_keys(&self) -> Vec<Key> {
        match self {
            Command::Prewrite(req) => req
                .mutations
                .iter()
                .map(|mutation| mutation.key().to_vec())
                .collect(),
            Command::Commit(req) => req.keys.clone(),
            Command::Cleanup(req) => vec![req.key.clone()],
            Command::BatchRollback(req) => req.keys.clone(),
            Command::CheckTxnStatus(req) => vec![req.primary.clone()],
            Command::ResolveLock(req) => req.keys.clone(),
            Command::Get(_)
            | Command::BatchGet(_)
            | Command::Scan(_)
            | Command::ScanLock(_)
            | Command::RawGet(_)
            | Command::RawPut(_)
            | Command::RawDelete(_)
            | Command::RawScan(_) => Vec::new(),
        }
    }
}

/// Typed result of one command, mirroring [`Command`] variant for variant.
#[derive(Debug)]
#[allow(clippy::large_enum_variant)]
pub enum CommandResponse {
    Get(GetResponse),
    BatchGet(BatchGetResponse),
    Scan(ScanResponse),
    Prewrite(PrewriteResponse),
    Commit(CommitResponse),
    Cleanup(CleanupResponse),
    BatchRollback(BatchRollbackResponse),
    CheckTxnStatus(CheckTxnStatusResponse),
    ScanLock(ScanLockResponse),
    ResolveLock(ResolveLockResponse),
    RawGet(RawGetResponse),
    RawPut(RawPutResponse),
    RawDelete(RawDeleteResponse),
    RawScan(RawScanResponse),
}
