use std::io;

use thiserror::Error;

/// A read that did not return the key it asked for.
///
/// Every write in a run stores `(k, k)`, so any other answer, including a
/// missing key, means the map under test lost or corrupted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("consistency violation: key {key} read back {observed:?}")]
pub struct ConsistencyViolation {
    /// The key passed to `get`.
    pub key: usize,
    /// What `get` returned.
    pub observed: Option<usize>,
}

/// Error type for contention runs.
#[derive(Debug, Error)]
pub enum ContentionError {
    /// A reader observed a wrong value.
    #[error(transparent)]
    Consistency(#[from] ConsistencyViolation),
    /// A worker thread panicked before reporting.
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    /// Run configuration out of range.
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
    /// No map implementation registered under this name.
    #[error("unknown map implementation `{0}`")]
    UnknownMap(String),
    /// No access pattern registered under this name.
    #[error("unknown access pattern `{0}`")]
    UnknownPattern(String),
    /// No execution mode registered under this name.
    #[error("unknown execution mode `{0}`")]
    UnknownMode(String),
}

/// Result type for contention runs.
pub type Result<T> = std::result::Result<T, ContentionError>;
