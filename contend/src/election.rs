use crossbeam::utils::CachePadded;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// What a worker does for the rest of its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Writer,
    Reader,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Writer => f.write_str("writer"),
            Role::Reader => f.write_str("reader"),
        }
    }
}

/// Picks exactly one writer among the workers of a run.
///
/// The flag starts unclaimed and flips to claimed on the first successful
/// [`attempt_claim`](WriterElection::attempt_claim). It never flips back: a
/// new election is constructed for every run. Losers get no second chance
/// and there is no fairness between them.
#[derive(Debug, Default)]
pub struct WriterElection {
    claimed: CachePadded<AtomicBool>,
}

impl WriterElection {
    pub fn new() -> Self {
        WriterElection {
            claimed: CachePadded::new(AtomicBool::new(false)),
        }
    }

    /// Returns true to exactly one caller over the lifetime of `self`.
    pub fn attempt_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claims the writer role if it is still free, otherwise reads.
    pub fn assign_role(&self) -> Role {
        if self.attempt_claim() {
            Role::Writer
        } else {
            Role::Reader
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn first_claim_wins() {
        let election = WriterElection::new();
        assert!(!election.is_claimed());
        assert!(election.attempt_claim());
        assert!(election.is_claimed());
        for _ in 0..10 {
            assert!(!election.attempt_claim());
        }
        assert_eq!(election.assign_role(), Role::Reader);
    }

    #[test]
    fn fresh_election_is_unclaimed() {
        let first = WriterElection::default();
        assert_eq!(first.assign_role(), Role::Writer);
        let second = WriterElection::new();
        assert_eq!(second.assign_role(), Role::Writer);
    }

    #[quickcheck]
    fn exactly_one_concurrent_winner(callers: u8) -> TestResult {
        let callers = (callers % 32) as usize;
        if callers == 0 {
            return TestResult::discard();
        }
        let election = Arc::new(WriterElection::new());
        let start = Arc::new(Barrier::new(callers));
        let handles: Vec<_> = (0..callers)
            .map(|_| {
                let election = election.clone();
                let start = start.clone();
                thread::spawn(move || {
                    start.wait();
                    election.attempt_claim()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        TestResult::from_bool(winners == 1)
    }
}
