use std::ops::Range;

use crate::map::ConcurrentMap;

/// A dense key range `[0, len)` in which every key's value is the key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpace {
    len: usize,
}

impl KeySpace {
    pub fn new(len: usize) -> Self {
        KeySpace { len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> Range<usize> {
        0..self.len
    }

    /// Key visited at position `i` of an endless cyclic walk.
    ///
    /// The key space must not be empty.
    pub(crate) fn key_at(&self, i: u64) -> usize {
        (i % self.len as u64) as usize
    }

    /// Builds a map sized for the whole key space and fills it.
    pub fn populate<M: ConcurrentMap>(&self) -> M {
        self.populate_with_capacity(self.len)
    }

    /// Builds a map with the given initial capacity and inserts `(k, k)` for
    /// every key.
    pub fn populate_with_capacity<M: ConcurrentMap>(&self, capacity: usize) -> M {
        let map = M::with_capacity(capacity);
        for key in self.iter() {
            map.set(key, key);
        }
        map
    }
}
