use keystone_common::{Key, Value};

use crate::cf::Cf;
use crate::error::StorageResult;
use crate::modify::WriteBatch;

/// A fixed read view over all column families, valid for the duration of one
/// command.
pub trait Snapshot {
    /// Iterator over `(key, value)` pairs in ascending key order, lazily
    /// produced, restartable from any key.
    type Iter<'a>: Iterator<Item = (Key, Value)>
    where
        Self: 'a;

    /// Point read at a column family.
    fn get_cf(&self, cf: Cf, key: &[u8]) -> StorageResult<Option<Value>>;

    /// Forward iteration over a column family starting at `from` (inclusive).
    fn iter_cf(&self, cf: Cf, from: &[u8]) -> StorageResult<Self::Iter<'_>>;
}

/// The raw storage substrate consumed by the transaction layer.
///
/// Implementations must apply a [`WriteBatch`] atomically: either every
/// mutation in the batch becomes visible or none does. Durability and
/// replication are the implementation's concern.
pub trait Engine: Send + Sync {
    type Snap: Snapshot;

    /// Obtain a read view usable across one command's duration.
    fn snapshot(&self) -> StorageResult<Self::Snap>;

    /// Atomically apply a batch of mutations.
    fn write(&self, batch: WriteBatch) -> StorageResult<()>;
}
