//! Host pool: the declared compute hosts and their per-host core capacity.
//!
//! The pool hands out [`SlotHandle`]s. Each handle stands for one running job
//! on one host; dropping it (or passing it to [`HostPool::release`]) frees the
//! core again. Acquisition waits until a core is free anywhere in the pool and
//! then picks the least loaded host.

mod pool;
mod types;

pub use pool::{HostPool, SlotHandle, MAX_POOL_CORES};
pub use types::{HostEntry, HostPoolError, HostStatus, PoolStatus};
