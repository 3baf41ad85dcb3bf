//! Harness for comparing concurrent hash maps under read/write contention.
//!
//! A run populates a fresh map with a [`KeySpace`] where every key maps to
//! itself, then drives it with either the [`ParallelRunner`] (one elected
//! writer, every other worker reading) or the [`SequentialRunner`] (one
//! thread alternating writes and reads). Every read is checked against the
//! key it asked for; a mismatch fails the run.

mod case;
mod election;
mod error;
mod keyspace;
pub mod map;
mod runner;

pub use case::{run_case, Case, RunConfig};
pub use election::{Role, WriterElection};
pub use error::{ConsistencyViolation, ContentionError, Result};
pub use keyspace::KeySpace;
pub use map::{ConcurrentMap, LockedMap, MapKind, SkipListMap, StripedHashMap};
pub use runner::{AccessPattern, ExecutionMode, ParallelRunner, RunReport, SequentialRunner};
