use std::ops::Bound;
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use crossbeam_skiplist::map;
use keystone_common::{Key, Value};
use parking_lot::Mutex;

use crate::cf::Cf;
use crate::engine::{Engine, Snapshot};
use crate::error::StorageResult;
use crate::modify::{Modify, WriteBatch};

/// One ordered map per column family.
#[derive(Default)]
struct Tables {
    default: SkipMap<Key, Value>,
    lock: SkipMap<Key, Value>,
    write: SkipMap<Key, Value>,
}

impl Tables {
    fn table(&self, cf: Cf) -> &SkipMap<Key, Value> {
        match cf {
            Cf::Default => &self.default,
            Cf::Lock => &self.lock,
            Cf::Write => &self.write,
        }
    }
}

/// In-memory storage engine backed by one skip list per column family.
///
/// Batches are applied under an internal mutex, in batch order. Commands
/// that build their batches with deletes after puts (as the transaction
/// layer does) never expose a state where a key's lock has disappeared
/// before its write record became visible.
pub struct MemoryEngine {
    tables: Arc<Tables>,
    write_lock: Mutex<()>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Tables::default()),
            write_lock: Mutex::new(()),
        }
    }

    /// Number of entries in a column family. Intended for tests and
    /// introspection.
    pub fn len_cf(&self, cf: Cf) -> usize {
        self.tables.table(cf).len()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MemoryEngine {
    type Snap = MemorySnapshot;

    fn snapshot(&self) -> StorageResult<Self::Snap> {
        Ok(MemorySnapshot {
            tables: self.tables.clone(),
        })
    }

    fn write(&self, batch: WriteBatch) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        for modify in batch.into_modifies() {
            match modify {
                Modify::Put { cf, key, value } => {
                    self.tables.table(cf).insert(key, value);
                }
                Modify::Delete { cf, key } => {
                    self.tables.table(cf).remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Read view over a [`MemoryEngine`].
///
/// Skip lists are only mutated through [`Engine::write`], and commands
/// serialize conflicting key sets through the latch layer, so a live view is
/// a consistent snapshot for every key a command declared.
pub struct MemorySnapshot {
    tables: Arc<Tables>,
}

impl Snapshot for MemorySnapshot {
    type Iter<'a> = MemoryIter<'a>;

    fn get_cf(&self, cf: Cf, key: &[u8]) -> StorageResult<Option<Value>> {
        Ok(self
            .tables
            .table(cf)
            .get(key)
            .map(|entry| entry.value().clone()))
    }

    fn iter_cf(&self, cf: Cf, from: &[u8]) -> StorageResult<Self::Iter<'_>> {
        let range = (Bound::Included(from.to_vec()), Bound::Unbounded);
        Ok(MemoryIter {
            inner: self.tables.table(cf).range(range),
        })
    }
}

/// Forward iterator over one column family of a [`MemorySnapshot`].
pub struct MemoryIter<'a> {
    inner: map::Range<'a, Key, (Bound<Key>, Bound<Key>), Key, Value>,
}

impl Iterator for MemoryIter<'_> {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
    }
}
