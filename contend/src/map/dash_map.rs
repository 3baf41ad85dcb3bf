use dashmap::DashMap;

use super::ConcurrentMap;

impl ConcurrentMap for DashMap<usize, usize> {
    const NAME: &'static str = "dashmap";

    fn with_capacity(capacity: usize) -> Self {
        DashMap::with_capacity(capacity)
    }

    fn get(&self, key: usize) -> Option<usize> {
        DashMap::get(self, &key).map(|entry| *entry.value())
    }

    fn set(&self, key: usize, value: usize) {
        self.insert(key, value);
    }
}
