use keystone_common::{Key, Value};

use crate::cf::Cf;

/// A single mutation destined for one column family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modify {
    Put { cf: Cf, key: Key, value: Value },
    Delete { cf: Cf, key: Key },
}

impl Modify {
    /// The column family this mutation targets.
    pub fn cf(&self) -> Cf {
        match self {
            Modify::Put { cf, .. } => *cf,
            Modify::Delete { cf, .. } => *cf,
        }
    }

    /// The key this mutation targets.
    pub fn key(&self) -> &[u8] {
        match self {
            Modify::Put { key, .. } => key,
            Modify::Delete { key, .. } => key,
        }
    }
}

/// An ordered list of mutations applied atomically by [`Engine::write`].
///
/// [`Engine::write`]: crate::engine::Engine::write
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    modifies: Vec<Modify>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, cf: Cf, key: Key, value: Value) {
        self.modifies.push(Modify::Put { cf, key, value });
    }

    pub fn delete(&mut self, cf: Cf, key: Key) {
        self.modifies.push(Modify::Delete { cf, key });
    }

    pub fn push(&mut self, modify: Modify) {
        self.modifies.push(modify);
    }

    pub fn is_empty(&self) -> bool {
        self.modifies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifies.len()
    }

    pub fn modifies(&self) -> &[Modify] {
        &self.modifies
    }

    pub fn into_modifies(self) -> Vec<Modify> {
        self.modifies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_preserves_order() {
        let mut batch = WriteBatch::new();
        batch.put(Cf::Lock, b"a".to_vec(), b"1".to_vec());
        batch.delete(Cf::Lock, b"a".to_vec());
        batch.put(Cf::Write, b"a".to_vec(), b"2".to_vec());

        assert_eq!(batch.len(), 3);
        let cfs: Vec<Cf> = batch.modifies().iter().map(|m| m.cf()).collect();
        assert_eq!(cfs, vec![Cf::Lock, Cf::Lock, Cf::Write]);
    }
}
