use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ConcurrentMap;

/// A concurrent hashmap implemented with one coarse-grained reader/writer lock.
///
/// Serves as the baseline the other maps are measured against.
pub struct LockedMap<K, V, S = RandomState>(RwLock<HashMap<K, V, S>>);

impl<K, V> LockedMap<K, V, RandomState> {
    pub fn new() -> Self {
        LockedMap(RwLock::new(HashMap::new()))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        LockedMap(RwLock::new(HashMap::with_capacity(capacity)))
    }
}

impl<K, V> Default for LockedMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> LockedMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    // A poisoned lock still guards a consistent map: no operation here can
    // panic halfway through a mutation.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V, S>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V, S>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks `key` up under the shared lock and returns a copy of its value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.read().get(key).cloned()
    }

    /// Inserts or overwrites under the exclusive lock.
    pub fn put(&self, key: K, value: V) {
        self.write().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConcurrentMap for LockedMap<usize, usize> {
    const NAME: &'static str = "locked";

    fn with_capacity(capacity: usize) -> Self {
        LockedMap::with_capacity(capacity)
    }

    fn get(&self, key: usize) -> Option<usize> {
        LockedMap::get(self, &key)
    }

    fn set(&self, key: usize, value: usize) {
        self.put(key, value);
    }
}
