//! The benchmark matrix: every map under every access pattern and mode.

use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use crate::error::{ContentionError, Result};
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentMap, LockedMap, MapKind, SkipListMap, StripedHashMap};
use crate::runner::{AccessPattern, ExecutionMode, ParallelRunner, RunReport, SequentialRunner};

const DEFAULT_EPOCHS: usize = 1 << 12;
const DEFAULT_CAPACITY: usize = 8;

/// Parameters shared by every case of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Size of the key space each map is populated with.
    pub epochs: usize,
    /// Worker threads in parallel mode, at least 1. Sequential runs use the
    /// calling thread regardless.
    pub workers: usize,
    /// Iterations per worker. In parallel mode one iteration sweeps the
    /// whole key space; in sequential mode it is one turn.
    pub budget: u64,
    /// Initial capacity requested from the map before population.
    pub capacity: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            epochs: DEFAULT_EPOCHS,
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            budget: 1,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl RunConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ContentionError::InvalidConfig(
                "workers must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// One benchmark entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Case {
    pub map: MapKind,
    pub pattern: AccessPattern,
    pub mode: ExecutionMode,
}

impl Case {
    pub fn new(map: MapKind, pattern: AccessPattern, mode: ExecutionMode) -> Self {
        Case { map, pattern, mode }
    }

    /// Every supported combination, grouped by mode and then pattern.
    pub fn all() -> impl Iterator<Item = Case> {
        ExecutionMode::ALL.into_iter().flat_map(|mode| {
            AccessPattern::ALL.into_iter().flat_map(move |pattern| {
                MapKind::ALL
                    .into_iter()
                    .filter(move |map| map.supports(mode))
                    .map(move |map| Case::new(map, pattern, mode))
            })
        })
    }

    pub fn is_supported(&self) -> bool {
        self.map.supports(self.mode)
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.mode, self.pattern, self.map)
    }
}

/// Populates a fresh map for `case` and runs it once.
///
/// A consistency violation does not make this return `Err`; it is carried
/// on the report so the elapsed time can still be inspected. Use
/// [`RunReport::into_result`] to treat it as an error.
pub fn run_case(case: Case, config: &RunConfig) -> Result<RunReport> {
    config.validate()?;
    if !case.is_supported() {
        return Err(ContentionError::InvalidConfig(format!(
            "{} cannot run in {} mode",
            case.map, case.mode
        )));
    }
    match case.map {
        MapKind::Locked => run_on::<LockedMap<usize, usize>>(case, config),
        MapKind::Striped => run_on::<StripedHashMap<usize, usize>>(case, config),
        MapKind::DashMap => run_on::<dashmap::DashMap<usize, usize>>(case, config),
        MapKind::Flurry => run_on::<flurry::HashMap<usize, usize>>(case, config),
        MapKind::SkipMap => run_on::<SkipListMap>(case, config),
        MapKind::Unsynchronized => Ok(run_unsynchronized(case, config)),
    }
}

fn run_unsynchronized(case: Case, config: &RunConfig) -> RunReport {
    let keys = KeySpace::new(config.epochs);
    let mut map = HashMap::with_capacity(config.capacity);
    map.extend(keys.iter().map(|k| (k, k)));
    debug!("{}: populated {} keys", case, keys.len());

    let report =
        SequentialRunner::new(config.budget).run_exclusive(&mut map, keys, case.pattern);
    log_report(case, &report);
    report
}

fn run_on<M: ConcurrentMap>(case: Case, config: &RunConfig) -> Result<RunReport> {
    let keys = KeySpace::new(config.epochs);
    let map: M = keys.populate_with_capacity(config.capacity);
    debug!("{}: populated {} keys", case, keys.len());

    let report = match case.mode {
        ExecutionMode::Parallel => {
            let runner = ParallelRunner::new(config.workers, config.budget)?;
            runner.run(Arc::new(map), keys, case.pattern)?
        }
        ExecutionMode::Sequential => {
            SequentialRunner::new(config.budget).run(&map, keys, case.pattern)
        }
    };
    log_report(case, &report);
    Ok(report)
}

fn log_report(case: Case, report: &RunReport) {
    info!(
        "{}: {} ops in {:?}{}",
        case,
        report.ops(),
        report.elapsed,
        if report.is_valid() { "" } else { " (invalid)" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn twenty_two_distinct_cases() {
        let cases: Vec<Case> = Case::all().collect();
        assert_eq!(cases.len(), 22);
        let unique: HashSet<Case> = cases.iter().copied().collect();
        assert_eq!(unique.len(), 22);
        let names: HashSet<String> = cases.iter().map(Case::to_string).collect();
        assert_eq!(names.len(), 22);
        assert!(names.contains("parallel/reads-with-writes/locked"));
        assert!(names.contains("sequential/reads-only/hashmap"));
        assert!(!names.contains("parallel/reads-only/hashmap"));
    }

    #[test]
    fn zero_workers_is_invalid() {
        let config = RunConfig::default().with_workers(0);
        let case = Case::new(
            MapKind::Locked,
            AccessPattern::ReadsOnly,
            ExecutionMode::Sequential,
        );
        assert!(matches!(
            run_case(case, &config),
            Err(ContentionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unsynchronized_map_rejected_in_parallel() {
        let config = RunConfig::default().with_epochs(16).with_workers(2);
        for pattern in AccessPattern::ALL {
            let case = Case::new(MapKind::Unsynchronized, pattern, ExecutionMode::Parallel);
            assert!(!case.is_supported());
            assert!(matches!(
                run_case(case, &config),
                Err(ContentionError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn unsynchronized_map_runs_sequentially() {
        let config = RunConfig::default().with_epochs(256).with_budget(512);
        let case = Case::new(
            MapKind::Unsynchronized,
            AccessPattern::ReadsWithWrites,
            ExecutionMode::Sequential,
        );
        let report = run_case(case, &config).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.writes, 256);
        assert_eq!(report.reads, 256);
    }

    #[test]
    fn default_config() {
        let config = RunConfig::default();
        assert_eq!(config.epochs, 4096);
        assert_eq!(config.capacity, 8);
        assert!(config.workers >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn every_case_passes() {
        const EPOCHS: usize = 4096;
        let base = RunConfig::default().with_epochs(EPOCHS).with_workers(4);
        for case in Case::all() {
            let budget = match (case.mode, case.pattern) {
                (ExecutionMode::Parallel, AccessPattern::ReadsWithWrites) => 10,
                (ExecutionMode::Parallel, AccessPattern::ReadsOnly) => 2,
                (ExecutionMode::Sequential, _) => 2 * EPOCHS as u64,
            };
            let report = run_case(case, &base.with_budget(budget)).unwrap();
            assert!(report.is_valid(), "{} failed: {:?}", case, report.violation);
            match case.mode {
                ExecutionMode::Parallel => {
                    assert_eq!(report.workers, 4);
                    assert_eq!(report.ops(), 4 * budget * EPOCHS as u64);
                }
                ExecutionMode::Sequential => assert_eq!(report.ops(), budget),
            }
        }
    }
}
