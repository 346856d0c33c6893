use std::fmt::{Debug, Write};

use log::trace;

use crate::bucket::{BucketEntry, BucketList};
use crate::config::IndexConfig;
use crate::primitives::Position;

/// Separately chained hash table keyed by station position.
///
/// The table grows by `resize_bits` whenever the entry count exceeds the grow threshold of the
/// current capacity and shrinks by the same shift when the count drops below the shrink
/// threshold, but never below `min_capacity`. Every resize rebuilds all chains.
pub struct PositionIndex<V> {
    buckets: Box<[BucketList<V>]>,
    len: usize,
    grow_at: usize,
    shrink_at: usize,
    config: IndexConfig,
}

fn empty_buckets<V>(capacity: usize) -> Box<[BucketList<V>]> {
    (0..capacity).map(|_| BucketList::new()).collect()
}

impl<V: Copy + Debug> PositionIndex<V> {
    pub fn new(config: IndexConfig) -> Self {
        Self::with_capacity(config.min_capacity, config)
    }

    /// Creates a table large enough to hold `num_entries` without growing.
    pub fn with_expected(num_entries: usize, config: IndexConfig) -> Self {
        let mut capacity = config.min_capacity;
        while config.grow_threshold(capacity) < num_entries {
            capacity <<= config.resize_bits;
        }
        Self::with_capacity(capacity, config)
    }

    fn with_capacity(capacity: usize, config: IndexConfig) -> Self {
        Self {
            buckets: empty_buckets(capacity),
            len: 0,
            grow_at: config.grow_threshold(capacity),
            shrink_at: config.shrink_threshold(capacity),
            config,
        }
    }

    fn hash(&self, key: Position) -> usize {
        key as usize % self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Inserts (key, value). Returns false without touching the table if the key exists.
    pub fn insert(&mut self, key: Position, value: V) -> bool {
        let hash = self.hash(key);
        if !self.buckets[hash].insert(key, value) {
            return false;
        }
        self.len += 1;
        while self.len > self.grow_at {
            self.rehash(self.capacity() << self.config.resize_bits);
        }
        true
    }

    /// Removes the entry with the given key and returns its value.
    pub fn remove(&mut self, key: Position) -> Option<V> {
        let hash = self.hash(key);
        let BucketEntry { value, .. } = self.buckets[hash].remove(key)?;
        self.len -= 1;
        while self.len < self.shrink_at && self.capacity() > self.config.min_capacity {
            let shrunk = (self.capacity() >> self.config.resize_bits).max(self.config.min_capacity);
            self.rehash(shrunk);
        }
        Some(value)
    }

    pub fn search(&self, key: Position) -> Option<V> {
        self.buckets[self.hash(key)].find(key)
    }

    /// Replaces the value of an existing entry. Returns false if the key is absent.
    pub fn update(&mut self, key: Position, value: V) -> bool {
        let hash = self.hash(key);
        match self.buckets[hash].find_mut(key) {
            Some(it) => {
                *it = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketEntry<V>> {
        self.buckets.iter().flat_map(|bucket| bucket.iter())
    }

    fn rehash(&mut self, new_capacity: usize) {
        trace!(
            "Rehashing position index with {} entries: {} -> {} buckets",
            self.len,
            self.capacity(),
            new_capacity
        );
        let old_buckets = std::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        self.grow_at = self.config.grow_threshold(new_capacity);
        self.shrink_at = self.config.shrink_threshold(new_capacity);

        for entry in old_buckets.into_vec().into_iter().flat_map(|it| it.into_entries()) {
            let hash = self.hash(entry.key);
            let inserted = self.buckets[hash].insert(entry.key, entry.value);
            debug_assert!(inserted, "duplicate key {} while rehashing", entry.key);
        }
    }

    /// Dumps every bucket chain, one line per bucket.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (idx, bucket) in self.buckets.iter().enumerate() {
            writeln!(out, "@{}: {:?}", idx, bucket).unwrap();
        }
        out
    }
}
