//! Non-transactional commands.
//!
//! Raw verbs operate directly on the Default family using the unversioned
//! user key. They never touch the Lock or Write families and need no
//! latching: each is a single storage operation with no read-modify-write
//! spanning a snapshot boundary.

use keystone_common::{Key, Value};

#[derive(Debug, Clone)]
pub struct RawGetRequest {
    pub key: Key,
}

#[derive(Debug, Clone)]
pub struct RawGetResponse {
    pub value: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct RawPutRequest {
    pub key: Key,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct RawPutResponse;

#[derive(Debug, Clone)]
pub struct RawDeleteRequest {
    pub key: Key,
}

#[derive(Debug, Clone)]
pub struct RawDeleteResponse;

#[derive(Debug, Clone)]
pub struct RawScanRequest {
    pub start_key: Key,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct RawScanResponse {
    pub pairs: Vec<(Key, Value)>,
}
