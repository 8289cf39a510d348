//! Types for the host pool.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One declared host and how many jobs it may run at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Host name as understood by the execution unit.
    pub name: String,
    /// Concurrent job slots on this host.
    pub cores: usize,
}

impl HostEntry {
    pub fn new(name: impl Into<String>, cores: usize) -> Self {
        Self {
            name: name.into(),
            cores,
        }
    }
}

impl<S: Into<String>> From<(S, usize)> for HostEntry {
    fn from((name, cores): (S, usize)) -> Self {
        Self::new(name, cores)
    }
}

/// Errors raised by the host pool.
#[derive(Debug, Error)]
pub enum HostPoolError {
    /// The hosts declare no core at all.
    #[error("host pool has zero total capacity")]
    ZeroCapacity,

    /// The hosts declare more cores than the pool can track.
    #[error("host pool capacity of {cores} cores exceeds the maximum of {max}")]
    CapacityTooLarge { cores: usize, max: usize },

    /// The pool was closed while waiting for a slot.
    #[error("host pool is closed")]
    Closed,
}

/// Live state of one host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostStatus {
    pub name: String,
    pub cores: usize,
    /// Jobs currently holding a slot on this host.
    pub active_jobs: usize,
    /// Slots handed out on this host since the pool was created.
    pub total_dispatched: u64,
}

/// Live state of the whole pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    pub total_capacity: usize,
    pub available: usize,
    pub hosts: Vec<HostStatus>,
}
