use std::fmt::Debug;

use crate::primitives::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BucketEntry<V> {
    pub key: Position,
    pub value: V,
}

/// A chain of one hash bucket. Keys are unique within the chain.
#[derive(Clone, PartialEq, Eq)]
pub struct BucketList<V> {
    entries: Vec<BucketEntry<V>>,
}

impl<V: Debug> Debug for BucketList<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            f.write_fmt(format_args!("({}, {:?}) ", entry.key, entry.value))?;
        }
        Ok(())
    }
}

impl<V> Default for BucketList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> BucketList<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends (key, value) unless the key is already present.
    /// Returns false and leaves the chain untouched on a duplicate key.
    pub fn insert(&mut self, key: Position, value: V) -> bool {
        if self.entries.iter().any(|it| it.key == key) {
            return false;
        }
        self.entries.push(BucketEntry { key, value });
        true
    }

    /// Detaches the entry with the given key and hands it to the caller.
    pub fn remove(&mut self, key: Position) -> Option<BucketEntry<V>> {
        let idx = self.entries.iter().position(|it| it.key == key)?;
        Some(self.entries.remove(idx))
    }

    pub fn find_mut(&mut self, key: Position) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|it| it.key == key)
            .map(|it| &mut it.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketEntry<V>> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = BucketEntry<V>> {
        self.entries.into_iter()
    }
}

impl<V: Copy> BucketList<V> {
    pub fn find(&self, key: Position) -> Option<V> {
        self.entries
            .iter()
            .find(|it| it.key == key)
            .map(|it| it.value)
    }
}
