//! Per-key latching.
//!
//! Latches make one command's {snapshot read, compute, batch apply} sequence
//! atomic with respect to every other command touching any of the same user
//! keys. They are in-process mutexes keyed by raw key bytes, unrelated to the
//! transactional Lock records.

use std::hash::{DefaultHasher, Hash, Hasher};

use keystone_common::Key;
use parking_lot::{Mutex, MutexGuard};

/// A partitioned mutex keyed by user-key bytes.
///
/// Keys hash into a fixed set of slots. A command acquires the slots of all
/// its declared keys, deduplicated and in ascending slot order, so two
/// commands can never hold-and-wait against each other. Commands with
/// disjoint slot sets proceed fully in parallel.
pub struct Latches {
    slots: Vec<Mutex<()>>,
}

impl Latches {
    pub fn new(slots: usize) -> Self {
        assert!(slots > 0, "latch table must have at least one slot");
        Self {
            slots: (0..slots).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Block until every slot covering `keys` is held, then return a guard.
    /// Releasing is the guard's `Drop`, so every exit path releases.
    pub fn acquire(&self, keys: &[Key]) -> LatchGuard<'_> {
        let mut indices: Vec<usize> = keys.iter().map(|key| self.slot_index(key)).collect();
        indices.sort_unstable();
        indices.dedup();
        let guards = indices
            .into_iter()
            .map(|index| self.slots[index].lock())
            .collect();
        LatchGuard { _guards: guards }
    }

    fn slot_index(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.slots.len()
    }
}

/// Holds the acquired slots of one command until dropped.
pub struct LatchGuard<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}
