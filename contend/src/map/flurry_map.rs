use flurry::HashMap;

use super::ConcurrentMap;

// One guard per call; a guard held across a worker loop stalls reclamation.
impl ConcurrentMap for HashMap<usize, usize> {
    const NAME: &'static str = "flurry";

    fn with_capacity(capacity: usize) -> Self {
        HashMap::with_capacity(capacity)
    }

    fn get(&self, key: usize) -> Option<usize> {
        self.pin().get(&key).copied()
    }

    fn set(&self, key: usize, value: usize) {
        self.pin().insert(key, value);
    }
}
