use keystone_common::{Key, Timestamp, Value};
use keystone_storage::Snapshot;

use crate::commands::scan::KvPair;
use crate::error::{TxnError, TxnResult};
use crate::reader::MvccReader;

/// Snapshot read of a single key.
#[derive(Debug, Clone)]
pub struct GetRequest {
    pub key: Key,
    pub ts: Timestamp,
}

#[derive(Debug, Clone)]
pub struct GetResponse {
    /// `None` means the key has no visible version at the read timestamp.
    pub value: Option<Value>,
}

pub(crate) fn process<S: Snapshot>(
    req: &GetRequest,
    reader: &MvccReader<'_, S>,
) -> TxnResult<GetResponse> {
    Ok(GetResponse {
        value: reader.get(&req.key, req.ts)?,
    })
}

/// Snapshot read of several independent keys at one timestamp.
#[derive(Debug, Clone)]
pub struct BatchGetRequest {
    pub keys: Vec<Key>,
    pub ts: Timestamp,
}

#[derive(Debug, Clone)]
pub struct BatchGetResponse {
    /// One pair per key that is either visible or locked; keys with no
    /// visible version are omitted.
    pub pairs: Vec<KvPair>,
}

pub(crate) fn process_batch<S: Snapshot>(
    req: &BatchGetRequest,
    reader: &MvccReader<'_, S>,
) -> TxnResult<BatchGetResponse> {
    let mut pairs = Vec::new();
    for key in &req.keys {
        match reader.get(key, req.ts) {
            Ok(Some(value)) => pairs.push(KvPair::value(key.clone(), value)),
            Ok(None) => {}
            Err(TxnError::KeyIsLocked(info)) => pairs.push(KvPair::locked(key.clone(), info)),
            Err(other) => return Err(other),
        }
    }
    Ok(BatchGetResponse { pairs })
}
