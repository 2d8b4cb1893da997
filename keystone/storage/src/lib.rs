//! Raw ordered-key storage substrate for keystone.
//!
//! The transaction layer only requires point reads at a chosen column family,
//! forward range iteration, and atomic application of a write batch. Those
//! primitives are captured by the [`Engine`] and [`Snapshot`] traits; the
//! bundled [`MemoryEngine`] is an ordered in-memory implementation backed by
//! skip lists.

pub mod cf;
pub mod engine;
pub mod error;
pub mod memory;
pub mod modify;

pub use cf::Cf;
pub use engine::{Engine, Snapshot};
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryEngine, MemorySnapshot};
pub use modify::{Modify, WriteBatch};
