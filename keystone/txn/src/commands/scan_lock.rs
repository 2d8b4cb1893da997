use keystone_common::Timestamp;
use keystone_storage::Snapshot;

use crate::config::SchedulerConfig;
use crate::error::TxnResult;
use crate::lock::LockInfo;
use crate::reader::MvccReader;

/// List outstanding locks with `start_ts <= max_ts` — candidates for
/// conflict resolution or garbage collection.
#[derive(Debug, Clone)]
pub struct ScanLockRequest {
    pub max_ts: Timestamp,
    /// 0 means "up to the configured maximum".
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct ScanLockResponse {
    pub locks: Vec<LockInfo>,
}

pub(crate) fn process<S: Snapshot>(
    req: &ScanLockRequest,
    reader: &MvccReader<'_, S>,
    config: &SchedulerConfig,
) -> TxnResult<ScanLockResponse> {
    let limit = if req.limit == 0 {
        config.max_scan_limit
    } else {
        req.limit.min(config.max_scan_limit)
    };
    let locks = reader
        .scan_locks(req.max_ts, limit)?
        .into_iter()
        .map(|(key, lock)| lock.info(&key))
        .collect();
    Ok(ScanLockResponse { locks })
}
