use crossbeam_skiplist::SkipMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::ConcurrentMap;

/// Ordered map; it has no notion of capacity, so the hint is ignored.
///
/// `SkipMap::insert` on a present key unlinks the old node before linking the
/// new one, so a concurrent `get` can miss the key entirely. Values are kept
/// in atomics instead and overwritten in place; a node, once linked, is never
/// removed.
impl ConcurrentMap for SkipMap<usize, AtomicUsize> {
    const NAME: &'static str = "skipmap";

    fn with_capacity(_capacity: usize) -> Self {
        SkipMap::new()
    }

    fn get(&self, key: usize) -> Option<usize> {
        SkipMap::get(self, &key).map(|entry| entry.value().load(Ordering::Acquire))
    }

    fn set(&self, key: usize, value: usize) {
        self.get_or_insert(key, AtomicUsize::new(value))
            .value()
            .store(value, Ordering::Release);
    }
}
