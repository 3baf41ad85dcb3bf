use crossbeam::utils::Backoff;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::{check_read, AccessPattern, RunReport};
use crate::election::{Role, WriterElection};
use crate::error::{ConsistencyViolation, ContentionError, Result};
use crate::keyspace::KeySpace;
use crate::map::ConcurrentMap;

/// Drives `workers` threads against one shared map.
///
/// With [`AccessPattern::ReadsWithWrites`] the workers race for a fresh
/// [`WriterElection`]; the winner rewrites every pair `budget` times while
/// everyone else reads every key `budget` times. With
/// [`AccessPattern::ReadsOnly`] all workers read.
///
/// Each worker stops when its own budget is spent. A reader that sees a wrong
/// value stops at once; the others carry on to the end of their budgets.
#[derive(Debug, Clone, Copy)]
pub struct ParallelRunner {
    workers: usize,
    budget: u64,
}

struct WorkerTally {
    role: Role,
    reads: u64,
    writes: u64,
    violation: Option<ConsistencyViolation>,
}

impl ParallelRunner {
    pub fn new(workers: usize, budget: u64) -> Result<Self> {
        if workers == 0 {
            return Err(ContentionError::InvalidConfig(
                "a parallel run needs at least one worker".to_owned(),
            ));
        }
        Ok(ParallelRunner { workers, budget })
    }

    pub fn run<M: ConcurrentMap>(
        &self,
        map: Arc<M>,
        keys: KeySpace,
        pattern: AccessPattern,
    ) -> Result<RunReport> {
        let election = Arc::new(WriterElection::new());
        let start = Arc::new(AtomicBool::new(false));

        let mut handles: Vec<JoinHandle<WorkerTally>> = Vec::with_capacity(self.workers);
        let mut spawn_error = None;
        for id in 0..self.workers {
            let tmap = map.clone();
            let t_election = election.clone();
            let t_start = start.clone();
            let budget = self.budget;
            let spawned = thread::Builder::new()
                .name(format!("contend-worker-{}", id))
                .spawn(move || {
                    wait_for_start(&t_start);
                    work(id, &*tmap, &t_election, keys, pattern, budget)
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        // Release whoever was spawned even on error, so nothing is left
        // spinning on the gate.
        let now = Instant::now();
        start.store(true, Ordering::Release);
        let joined: Vec<_> = handles.into_iter().map(JoinHandle::join).collect();
        let elapsed = now.elapsed();

        if let Some(err) = spawn_error {
            return Err(err.into());
        }

        let mut report = RunReport::empty(self.workers);
        report.elapsed = elapsed;
        for (worker, tally) in joined.into_iter().enumerate() {
            let tally = tally.map_err(|_| ContentionError::WorkerPanicked { worker })?;
            if tally.role == Role::Writer {
                report.writers += 1;
            }
            report.reads += tally.reads;
            report.writes += tally.writes;
            if report.violation.is_none() {
                report.violation = tally.violation;
            }
        }
        debug_assert!(report.writers <= 1, "{} writers elected", report.writers);

        match report.violation {
            Some(violation) => warn!(
                "{} {} parallel run invalid after {:?}: {}",
                M::NAME,
                pattern,
                elapsed,
                violation
            ),
            None => debug!(
                "{} {} parallel run: {} workers, {} reads, {} writes in {:?}",
                M::NAME,
                pattern,
                self.workers,
                report.reads,
                report.writes,
                elapsed
            ),
        }
        Ok(report)
    }
}

fn wait_for_start(start: &AtomicBool) {
    let backoff = Backoff::new();
    while !start.load(Ordering::Acquire) {
        backoff.snooze();
    }
}

fn work<M: ConcurrentMap>(
    id: usize,
    map: &M,
    election: &WriterElection,
    keys: KeySpace,
    pattern: AccessPattern,
    budget: u64,
) -> WorkerTally {
    let role = if pattern.writes() {
        election.assign_role()
    } else {
        Role::Reader
    };
    debug!("worker {} is {}", id, role);

    let mut tally = WorkerTally {
        role,
        reads: 0,
        writes: 0,
        violation: None,
    };
    match role {
        Role::Writer => {
            for _ in 0..budget {
                for key in keys.iter() {
                    map.set(key, key);
                }
            }
            tally.writes = budget.saturating_mul(keys.len() as u64);
        }
        Role::Reader => {
            'run: for _ in 0..budget {
                for key in keys.iter() {
                    tally.reads += 1;
                    if let Err(violation) = check_read(map, key) {
                        tally.violation = Some(violation);
                        break 'run;
                    }
                }
            }
        }
    }
    tally
}
