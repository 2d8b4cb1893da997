//! Shared types for the keystone key-value store.
//!
//! This crate carries the primitive vocabulary (keys, values, timestamps)
//! that is used across both the storage and transaction layers.

pub mod types;

pub use types::{Key, Timestamp, Value};
