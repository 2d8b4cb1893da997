use keystone_common::{Key, Timestamp, Value};
use keystone_storage::Snapshot;

use crate::config::SchedulerConfig;
use crate::error::TxnResult;
use crate::lock::LockInfo;
use crate::reader::MvccReader;

/// Forward range read: up to `limit` visible rows starting at `start_key`.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub start_key: Key,
    pub limit: usize,
    pub ts: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ScanResponse {
    pub pairs: Vec<KvPair>,
}

/// One scan result row: either a visible value or a per-row lock conflict.
/// A locked row does not abort the scan; other rows are still returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: Key,
    pub value: Option<Value>,
    pub locked: Option<LockInfo>,
}

impl KvPair {
    pub fn value(key: Key, value: Value) -> Self {
        Self {
            key,
            value: Some(value),
            locked: None,
        }
    }

    pub fn locked(key: Key, info: LockInfo) -> Self {
        Self {
            key,
            value: None,
            locked: Some(info),
        }
    }
}

pub(crate) fn process<S: Snapshot>(
    req: &ScanRequest,
    reader: &MvccReader<'_, S>,
    config: &SchedulerConfig,
) -> TxnResult<ScanResponse> {
    let limit = req.limit.min(config.max_scan_limit);
    let mut pairs = Vec::new();
    let mut cursor = req.start_key.clone();

    while pairs.len() < limit {
        // The next candidate row is the smaller of the next key with write
        // history and the next locked key; a lock on a never-written key must
        // still surface as a conflict.
        let next_write = reader.next_write_key(&cursor)?;
        let next_lock = reader.next_lock_key(&cursor)?;
        let candidate = match (next_write, next_lock) {
            (Some(write_key), Some(lock_key)) => write_key.min(lock_key),
            (Some(write_key), None) => write_key,
            (None, Some(lock_key)) => lock_key,
            (None, None) => break,
        };

        if let Some(lock) = reader.lock(&candidate)? {
            if lock.is_blocking(req.ts) {
                pairs.push(KvPair::locked(candidate.clone(), lock.info(&candidate)));
                cursor = next_key(candidate);
                continue;
            }
        }
        if let Some(value) = reader.get_committed(&candidate, req.ts)? {
            pairs.push(KvPair::value(candidate.clone(), value));
        }
        cursor = next_key(candidate);
    }

    Ok(ScanResponse { pairs })
}

/// The smallest key strictly greater than `key`.
fn next_key(mut key: Key) -> Key {
    key.push(0);
    key
}
