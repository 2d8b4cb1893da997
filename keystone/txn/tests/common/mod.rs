#![allow(dead_code)]

use keystone_common::{Timestamp, Value};
use keystone_storage::MemoryEngine;
use keystone_txn::commands::{
    CommitRequest, GetRequest, Mutation, PrewriteRequest, PrewriteResponse,
};
use keystone_txn::{Scheduler, TxnError};

pub const TEST_TTL: u64 = 1000;

pub fn new_scheduler() -> Scheduler<MemoryEngine> {
    Scheduler::with_default_config(MemoryEngine::new())
}

pub fn ts(n: u64) -> Timestamp {
    Timestamp::with_ts(n)
}

/// Prewrite a single Put with the key as its own primary; panics on any
/// per-key error.
pub fn must_prewrite_put(
    scheduler: &Scheduler<MemoryEngine>,
    key: &[u8],
    value: &[u8],
    start_ts: u64,
) {
    let resp = try_prewrite_put(scheduler, key, value, start_ts);
    assert!(resp.is_ok(), "prewrite failed: {:?}", resp.key_errors);
}

pub fn try_prewrite_put(
    scheduler: &Scheduler<MemoryEngine>,
    key: &[u8],
    value: &[u8],
    start_ts: u64,
) -> PrewriteResponse {
    scheduler
        .prewrite(PrewriteRequest {
            start_ts: ts(start_ts),
            mutations: vec![Mutation::Put {
                key: key.to_vec(),
                value: value.to_vec(),
            }],
            primary: key.to_vec(),
            ttl: TEST_TTL,
        })
        .unwrap()
}

pub fn must_commit(
    scheduler: &Scheduler<MemoryEngine>,
    key: &[u8],
    start_ts: u64,
    commit_ts: u64,
) {
    scheduler
        .commit(CommitRequest {
            start_ts: ts(start_ts),
            commit_ts: ts(commit_ts),
            keys: vec![key.to_vec()],
        })
        .unwrap();
}

/// Commit a Put in one step: prewrite at `start_ts` then commit at
/// `commit_ts`.
pub fn must_put(
    scheduler: &Scheduler<MemoryEngine>,
    key: &[u8],
    value: &[u8],
    start_ts: u64,
    commit_ts: u64,
) {
    must_prewrite_put(scheduler, key, value, start_ts);
    must_commit(scheduler, key, start_ts, commit_ts);
}

pub fn must_get(
    scheduler: &Scheduler<MemoryEngine>,
    key: &[u8],
    read_ts: u64,
    expected: &[u8],
) {
    let resp = scheduler
        .get(GetRequest {
            key: key.to_vec(),
            ts: ts(read_ts),
        })
        .unwrap();
    assert_eq!(resp.value, Some(expected.to_vec()));
}

pub fn must_get_none(scheduler: &Scheduler<MemoryEngine>, key: &[u8], read_ts: u64) {
    let resp = scheduler
        .get(GetRequest {
            key: key.to_vec(),
            ts: ts(read_ts),
        })
        .unwrap();
    assert_eq!(resp.value, None);
}

pub fn must_get_locked(scheduler: &Scheduler<MemoryEngine>, key: &[u8], read_ts: u64) {
    let err = scheduler
        .get(GetRequest {
            key: key.to_vec(),
            ts: ts(read_ts),
        })
        .unwrap_err();
    assert!(matches!(err, TxnError::KeyIsLocked(_)), "got {err:?}");
}

pub fn value_of(value: Option<Value>) -> Value {
    value.expect("expected a value")
}
