use crossbeam::utils::CachePadded;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ConcurrentMap;

const DEFAULT_NUM_STRIPES: usize = 16;

type Stripe<K, V, S> = CachePadded<RwLock<HashMap<K, V, S>>>;

/// A concurrent hashmap split into independently locked stripes.
///
/// Each key hashes to exactly one stripe, so readers and writers only contend
/// when they touch the same stripe. The stripe count is fixed at construction.
pub struct StripedHashMap<K, V, S = RandomState> {
    stripes: Box<[Stripe<K, V, S>]>,
    state: S,
}

impl<K, V> Default for StripedHashMap<K, V, RandomState>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> StripedHashMap<K, V, RandomState>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        StripedHashMap::build(DEFAULT_NUM_STRIPES, 0, RandomState::new())
    }

    pub fn with_num_stripes(num_stripes: usize) -> Self {
        StripedHashMap::build(num_stripes, 0, RandomState::new())
    }

    /// Default stripe count, with `capacity` spread evenly over the stripes.
    pub fn with_capacity(capacity: usize) -> Self {
        StripedHashMap::build(DEFAULT_NUM_STRIPES, capacity, RandomState::new())
    }
}

impl<K, V, S> StripedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Clone,
{
    fn build(num_stripes: usize, capacity: usize, hasher: S) -> Self {
        let num_stripes = num_stripes.max(1);
        let per_stripe = capacity / num_stripes;
        let stripes = (0..num_stripes)
            .map(|_| {
                CachePadded::new(RwLock::new(HashMap::with_capacity_and_hasher(
                    per_stripe,
                    hasher.clone(),
                )))
            })
            .collect();
        StripedHashMap {
            stripes,
            state: hasher,
        }
    }
}

impl<K, V, S> StripedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn hash(&self, key: &K) -> usize {
        let mut hasher = self.state.build_hasher();
        key.hash(&mut hasher);
        hasher.finish() as usize
    }

    pub fn num_stripes(&self) -> usize {
        self.stripes.len()
    }

    fn stripe_for(&self, key: &K) -> &RwLock<HashMap<K, V, S>> {
        // The low bits pick the bucket inside the stripe's own table, so use
        // the high bits to pick the stripe.
        let hash = self.hash(key).rotate_left(16);
        &self.stripes[hash % self.stripes.len()]
    }

    fn read_stripe(&self, key: &K) -> RwLockReadGuard<'_, HashMap<K, V, S>> {
        self.stripe_for(key)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_stripe(&self, key: &K) -> RwLockWriteGuard<'_, HashMap<K, V, S>> {
        self.stripe_for(key)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.read_stripe(key).get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.read_stripe(key).contains_key(key)
    }

    /// Emplaces a key-value pair, overwriting the previous value for `key`.
    pub fn put(&self, key: K, value: V) {
        let mut stripe = self.write_stripe(&key);
        stripe.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.stripes
            .iter()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConcurrentMap for StripedHashMap<usize, usize> {
    const NAME: &'static str = "striped";

    fn with_capacity(capacity: usize) -> Self {
        StripedHashMap::with_capacity(capacity)
    }

    fn get(&self, key: usize) -> Option<usize> {
        StripedHashMap::get(self, &key)
    }

    fn set(&self, key: usize, value: usize) {
        self.put(key, value);
    }
}
