use log::{debug, warn};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::time::Instant;

use super::{verify, AccessPattern, RunReport};
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentMap, MapKind};

/// Drives a map from the calling thread only, measuring per-operation cost
/// without any contention.
///
/// With [`AccessPattern::ReadsWithWrites`] the turns strictly alternate,
/// starting with a write. A write turn and the read turn after it target the
/// same key, walking the key space cyclically, so `budget = 2 * len` writes
/// and then reads back every key exactly once. This deliberately differs
/// from the plain `i mod len` walk that opens with a read: there, a read turn
/// never lands on the key the previous write touched. With
/// [`AccessPattern::ReadsOnly`] every turn reads the next key.
#[derive(Debug, Clone, Copy)]
pub struct SequentialRunner {
    budget: u64,
}

/// One side of the turn loop: either a shared concurrent map or an
/// exclusively borrowed plain `HashMap`.
trait Turns {
    fn name(&self) -> &'static str;
    fn read(&self, key: usize) -> Option<usize>;
    fn write(&mut self, key: usize, value: usize);
}

struct Shared<'a, M>(&'a M);

impl<M: ConcurrentMap> Turns for Shared<'_, M> {
    fn name(&self) -> &'static str {
        M::NAME
    }

    fn read(&self, key: usize) -> Option<usize> {
        self.0.get(key)
    }

    fn write(&mut self, key: usize, value: usize) {
        self.0.set(key, value);
    }
}

struct Exclusive<'a, S>(&'a mut HashMap<usize, usize, S>);

impl<S: BuildHasher> Turns for Exclusive<'_, S> {
    fn name(&self) -> &'static str {
        MapKind::Unsynchronized.name()
    }

    fn read(&self, key: usize) -> Option<usize> {
        self.0.get(&key).copied()
    }

    fn write(&mut self, key: usize, value: usize) {
        self.0.insert(key, value);
    }
}

impl SequentialRunner {
    pub fn new(budget: u64) -> Self {
        SequentialRunner { budget }
    }

    pub fn run<M: ConcurrentMap>(
        &self,
        map: &M,
        keys: KeySpace,
        pattern: AccessPattern,
    ) -> RunReport {
        self.drive(Shared(map), keys, pattern)
    }

    /// Same turns against a `HashMap` with no synchronization at all, the
    /// floor the concurrent maps are compared against.
    pub fn run_exclusive<S: BuildHasher>(
        &self,
        map: &mut HashMap<usize, usize, S>,
        keys: KeySpace,
        pattern: AccessPattern,
    ) -> RunReport {
        self.drive(Exclusive(map), keys, pattern)
    }

    fn drive<T: Turns>(&self, mut map: T, keys: KeySpace, pattern: AccessPattern) -> RunReport {
        let mut report = RunReport::empty(1);
        if keys.is_empty() {
            return report;
        }

        let now = Instant::now();
        match pattern {
            AccessPattern::ReadsOnly => {
                for i in 0..self.budget {
                    let key = keys.key_at(i);
                    report.reads += 1;
                    if let Err(violation) = verify(map.name(), key, map.read(key)) {
                        report.violation = Some(violation);
                        break;
                    }
                }
            }
            AccessPattern::ReadsWithWrites => {
                let mut writer = true;
                for i in 0..self.budget {
                    let key = keys.key_at(i / 2);
                    if writer {
                        map.write(key, key);
                        report.writes += 1;
                    } else {
                        report.reads += 1;
                        if let Err(violation) = verify(map.name(), key, map.read(key)) {
                            report.violation = Some(violation);
                            break;
                        }
                    }
                    writer = !writer;
                }
                report.writers = 1;
            }
        }
        report.elapsed = now.elapsed();

        match report.violation {
            Some(violation) => warn!(
                "{} {} sequential run invalid after {:?}: {}",
                map.name(),
                pattern,
                report.elapsed,
                violation
            ),
            None => debug!(
                "{} {} sequential run: {} reads, {} writes in {:?}",
                map.name(),
                pattern,
                report.reads,
                report.writes,
                report.elapsed
            ),
        }
        report
    }
}
