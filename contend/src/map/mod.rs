//! This module contains the concurrent hash maps a run can be driven against.

mod dash_map;
mod flurry_map;
mod locked_map;
mod skip_map;
mod striped_map;

pub use locked_map::LockedMap;
pub use striped_map::StripedHashMap;

use std::fmt;
use std::str::FromStr;

use crate::error::ContentionError;
use crate::runner::ExecutionMode;

/// Concrete skip list instantiation registered as [`MapKind::SkipMap`].
pub type SkipListMap = crossbeam_skiplist::SkipMap<usize, std::sync::atomic::AtomicUsize>;

/// Point lookups and overwrites over `usize` keys and values.
///
/// This is the only surface the runners use, so every implementation is
/// driven identically regardless of how its native API is shaped.
pub trait ConcurrentMap: Send + Sync + 'static {
    /// Name used in reports and benchmark ids.
    const NAME: &'static str;

    /// Creates an empty map with room for about `capacity` entries.
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    /// Returns the value stored under `key`, if there is one.
    ///
    /// Must be safe to call concurrently with any number of other `get`
    /// calls and with at most one concurrent `set` on the same map.
    fn get(&self, key: usize) -> Option<usize>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set(&self, key: usize, value: usize);
}

/// The map implementations registered with the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// [`LockedMap`], the reader/writer locked baseline.
    Locked,
    /// [`StripedHashMap`].
    Striped,
    /// `dashmap::DashMap`.
    DashMap,
    /// `flurry::HashMap`.
    Flurry,
    /// `crossbeam_skiplist::SkipMap`, see [`SkipListMap`].
    SkipMap,
    /// Plain `std::collections::HashMap` with no synchronization at all.
    /// Sequential mode only.
    Unsynchronized,
}

impl MapKind {
    pub const ALL: [MapKind; 6] = [
        MapKind::Locked,
        MapKind::Striped,
        MapKind::DashMap,
        MapKind::Flurry,
        MapKind::SkipMap,
        MapKind::Unsynchronized,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MapKind::Locked => LockedMap::<usize, usize>::NAME,
            MapKind::Striped => StripedHashMap::<usize, usize>::NAME,
            MapKind::DashMap => dashmap::DashMap::<usize, usize>::NAME,
            MapKind::Flurry => flurry::HashMap::<usize, usize>::NAME,
            MapKind::SkipMap => SkipListMap::NAME,
            MapKind::Unsynchronized => "hashmap",
        }
    }

    /// Whether the map can be shared between threads at all.
    pub fn supports(self, mode: ExecutionMode) -> bool {
        self != MapKind::Unsynchronized || mode == ExecutionMode::Sequential
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapKind {
    type Err = ContentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ContentionError::UnknownMap(s.to_owned()))
    }
}
