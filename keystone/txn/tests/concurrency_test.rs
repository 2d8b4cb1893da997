mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use common::*;
use keystone_storage::{Cf, MemoryEngine};
use keystone_txn::commands::{CommitRequest, GetRequest, Mutation, PrewriteRequest};
use keystone_txn::{Scheduler, TxnError};
use rand::Rng;

/// A stand-in for the external timestamp oracle.
struct Oracle {
    counter: AtomicU64,
}

impl Oracle {
    fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

/// Transactional read-modify-write of a counter key. Conflicting attempts
/// lose the prewrite race and retry with a fresh start_ts, so no update may
/// ever be lost.
#[test]
fn test_no_lost_updates_on_one_key() {
    let scheduler = Arc::new(new_scheduler());
    let oracle = Arc::new(Oracle::new());
    let threads = 4;
    let increments = 25;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let scheduler = scheduler.clone();
            let oracle = oracle.clone();
            thread::spawn(move || {
                for _ in 0..increments {
                    increment_until_success(&scheduler, &oracle, b"counter");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let read_ts = oracle.next();
    let resp = scheduler
        .get(GetRequest {
            key: b"counter".to_vec(),
            ts: ts(read_ts),
        })
        .unwrap();
    let total: u64 = String::from_utf8(resp.value.unwrap()).unwrap().parse().unwrap();
    assert_eq!(total, threads * increments);
}

fn increment_until_success(scheduler: &Scheduler<MemoryEngine>, oracle: &Oracle, key: &[u8]) {
    loop {
        let start_ts = oracle.next();
        let current = match scheduler.get(GetRequest {
            key: key.to_vec(),
            ts: ts(start_ts),
        }) {
            Ok(resp) => resp
                .value
                .map(|bytes| String::from_utf8(bytes).unwrap().parse::<u64>().unwrap())
                .unwrap_or(0),
            // Someone else holds the key; restart with a fresh timestamp.
            Err(TxnError::KeyIsLocked(_)) => continue,
            Err(other) => panic!("unexpected error: {other:?}"),
        };

        let prewrite = scheduler
            .prewrite(PrewriteRequest {
                start_ts: ts(start_ts),
                mutations: vec![Mutation::Put {
                    key: key.to_vec(),
                    value: (current + 1).to_string().into_bytes(),
                }],
                primary: key.to_vec(),
                ttl: TEST_TTL,
            })
            .unwrap();
        if !prewrite.is_ok() {
            continue;
        }

        let commit_ts = oracle.next();
        scheduler
            .commit(CommitRequest {
                start_ts: ts(start_ts),
                commit_ts: ts(commit_ts),
                keys: vec![key.to_vec()],
            })
            .unwrap();
        return;
    }
}

/// Transactions over disjoint keys never conflict with each other.
#[test]
fn test_disjoint_keys_commit_in_parallel() {
    let scheduler = Arc::new(new_scheduler());
    let oracle = Arc::new(Oracle::new());
    let threads = 8;

    let handles: Vec<_> = (0..threads)
        .map(|i: u64| {
            let scheduler = scheduler.clone();
            let oracle = oracle.clone();
            thread::spawn(move || {
                let key = format!("key-{i}").into_bytes();
                for round in 0..20 {
                    let start_ts = oracle.next();
                    let resp = scheduler
                        .prewrite(PrewriteRequest {
                            start_ts: ts(start_ts),
                            mutations: vec![Mutation::Put {
                                key: key.clone(),
                                value: format!("round-{round}").into_bytes(),
                            }],
                            primary: key.clone(),
                            ttl: TEST_TTL,
                        })
                        .unwrap();
                    assert!(resp.is_ok(), "disjoint prewrite conflicted");
                    let commit_ts = oracle.next();
                    scheduler
                        .commit(CommitRequest {
                            start_ts: ts(start_ts),
                            commit_ts: ts(commit_ts),
                            keys: vec![key.clone()],
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(scheduler.engine().len_cf(Cf::Lock), 0);
    let read_ts = oracle.next();
    for i in 0..threads {
        let key = format!("key-{i}").into_bytes();
        let resp = scheduler
            .get(GetRequest {
                key,
                ts: ts(read_ts),
            })
            .unwrap();
        assert_eq!(resp.value, Some(b"round-19".to_vec()));
    }
}

/// Random multi-key transactions across a small keyspace: after the dust
/// settles no locks remain and every key holds a consistent final value.
#[test]
fn test_randomized_multi_key_transactions() {
    let scheduler = Arc::new(new_scheduler());
    let oracle = Arc::new(Oracle::new());
    let keyspace: Vec<Vec<u8>> = (0..6).map(|i| format!("k{i}").into_bytes()).collect();
    let threads = 4;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let scheduler = scheduler.clone();
            let oracle = oracle.clone();
            let keyspace = keyspace.clone();
            thread::spawn(move || {
                let mut rng = rand::rng();
                let mut committed = 0;
                while committed < 10 {
                    let start_ts = oracle.next();
                    let first = rng.random_range(0..keyspace.len());
                    let second = rng.random_range(0..keyspace.len());
                    let mut keys = vec![keyspace[first].clone()];
                    if second != first {
                        keys.push(keyspace[second].clone());
                    }
                    let mutations: Vec<Mutation> = keys
                        .iter()
                        .map(|key| Mutation::Put {
                            key: key.clone(),
                            value: start_ts.to_string().into_bytes(),
                        })
                        .collect();
                    let resp = scheduler
                        .prewrite(PrewriteRequest {
                            start_ts: ts(start_ts),
                            mutations,
                            primary: keys[0].clone(),
                            ttl: TEST_TTL,
                        })
                        .unwrap();
                    if !resp.is_ok() {
                        continue;
                    }
                    let commit_ts = oracle.next();
                    scheduler
                        .commit(CommitRequest {
                            start_ts: ts(start_ts),
                            commit_ts: ts(commit_ts),
                            keys,
                        })
                        .unwrap();
                    committed += 1;
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(scheduler.engine().len_cf(Cf::Lock), 0);
    let read_ts = oracle.next();
    for key in &keyspace {
        // Every key must be readable without hitting a stale lock.
        scheduler
            .get(GetRequest {
                key: key.clone(),
                ts: ts(read_ts),
            })
            .unwrap();
    }
}
