//! Execution modes that drive a populated map and check every read.

mod parallel;
mod sequential;

pub use parallel::ParallelRunner;
pub use sequential::SequentialRunner;

use log::error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConsistencyViolation, ContentionError, Result};
use crate::map::ConcurrentMap;

/// Which operations a run issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessPattern {
    /// Reads only, no writer is elected.
    ReadsOnly,
    /// One writer rewriting every pair while the rest read.
    ReadsWithWrites,
}

impl AccessPattern {
    pub const ALL: [AccessPattern; 2] = [AccessPattern::ReadsOnly, AccessPattern::ReadsWithWrites];

    pub fn name(self) -> &'static str {
        match self {
            AccessPattern::ReadsOnly => "reads-only",
            AccessPattern::ReadsWithWrites => "reads-with-writes",
        }
    }

    pub fn writes(self) -> bool {
        self == AccessPattern::ReadsWithWrites
    }
}

impl fmt::Display for AccessPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccessPattern {
    type Err = ContentionError;

    fn from_str(s: &str) -> Result<Self> {
        AccessPattern::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ContentionError::UnknownPattern(s.to_owned()))
    }
}

/// How many threads drive the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Many workers contending on one map, see [`ParallelRunner`].
    Parallel,
    /// One thread alternating turns, see [`SequentialRunner`].
    Sequential,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 2] = [ExecutionMode::Parallel, ExecutionMode::Sequential];

    pub fn name(self) -> &'static str {
        match self {
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutionMode {
    type Err = ContentionError;

    fn from_str(s: &str) -> Result<Self> {
        ExecutionMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ContentionError::UnknownMode(s.to_owned()))
    }
}

/// Outcome of one run.
///
/// `elapsed` is recorded even when a violation was observed, but such a
/// measurement is invalid and must not be compared against passing runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub elapsed: Duration,
    pub reads: u64,
    pub writes: u64,
    pub workers: usize,
    pub writers: usize,
    pub violation: Option<ConsistencyViolation>,
}

impl RunReport {
    pub(crate) fn empty(workers: usize) -> Self {
        RunReport {
            elapsed: Duration::ZERO,
            reads: 0,
            writes: 0,
            workers,
            writers: 0,
            violation: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.violation.is_none()
    }

    pub fn ops(&self) -> u64 {
        self.reads + self.writes
    }

    /// Turns a failed run into its violation.
    pub fn into_result(self) -> Result<RunReport> {
        match self.violation {
            Some(violation) => Err(violation.into()),
            None => Ok(self),
        }
    }
}

/// Reads `key` and checks that it maps to itself.
#[inline]
pub(crate) fn check_read<M: ConcurrentMap>(
    map: &M,
    key: usize,
) -> std::result::Result<(), ConsistencyViolation> {
    verify(M::NAME, key, map.get(key))
}

#[inline]
pub(crate) fn verify(
    name: &str,
    key: usize,
    observed: Option<usize>,
) -> std::result::Result<(), ConsistencyViolation> {
    match observed {
        Some(value) if value == key => Ok(()),
        observed => {
            let violation = ConsistencyViolation { key, observed };
            error!("{}: {}", name, violation);
            Err(violation)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_and_mode_names_parse() {
        for p in AccessPattern::ALL {
            assert_eq!(p.name().parse::<AccessPattern>().unwrap(), p);
        }
        for m in ExecutionMode::ALL {
            assert_eq!(m.to_string().parse::<ExecutionMode>().unwrap(), m);
        }
        assert!(matches!(
            "writes-only".parse::<AccessPattern>(),
            Err(ContentionError::UnknownPattern(_))
        ));
        assert!(matches!(
            "async".parse::<ExecutionMode>(),
            Err(ContentionError::UnknownMode(_))
        ));
    }

    #[test]
    fn invalid_report_converts_to_error() {
        let mut report = RunReport::empty(2);
        assert!(report.clone().into_result().is_ok());
        report.violation = Some(ConsistencyViolation {
            key: 9,
            observed: None,
        });
        assert!(!report.is_valid());
        match report.into_result() {
            Err(ContentionError::Consistency(v)) => assert_eq!(v.key, 9),
            other => panic!("unexpected {:?}", other),
        }
    }
}
