//! Semaphore-gated host pool.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::types::{HostEntry, HostPoolError, HostStatus, PoolStatus};

struct HostSlots {
    entry: HostEntry,
    permits: Arc<Semaphore>,
    active: AtomicUsize,
    total_dispatched: AtomicU64,
}

struct PoolInner {
    capacity: Arc<Semaphore>,
    total_capacity: usize,
    hosts: Vec<HostSlots>,
}

/// A finite pool of job slots spread across hosts.
///
/// Cloning is cheap; clones share the same slots.
#[derive(Clone)]
pub struct HostPool {
    inner: Arc<PoolInner>,
}

/// A claimed job slot on one host. The slot is freed when the handle drops.
pub struct SlotHandle {
    host_index: usize,
    pool: Arc<PoolInner>,
    _host_permit: OwnedSemaphorePermit,
    _capacity_permit: OwnedSemaphorePermit,
}

impl SlotHandle {
    /// Name of the host this slot lives on.
    pub fn host(&self) -> &str {
        &self.pool.hosts[self.host_index].entry.name
    }
}

impl Drop for SlotHandle {
    fn drop(&mut self) {
        self.pool.hosts[self.host_index]
            .active
            .fetch_sub(1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for SlotHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotHandle")
            .field("host", &self.host())
            .finish()
    }
}

/// Most cores a pool can hold, summed over all hosts.
pub const MAX_POOL_CORES: usize = Semaphore::MAX_PERMITS;

impl HostPool {
    /// Creates a pool from host declarations. Hosts with zero cores are ignored.
    pub fn new(hosts: impl IntoIterator<Item = HostEntry>) -> Result<Self, HostPoolError> {
        let entries: Vec<HostEntry> = hosts.into_iter().filter(|entry| entry.cores > 0).collect();

        let total_capacity = entries
            .iter()
            .fold(0usize, |total, entry| total.saturating_add(entry.cores));
        if total_capacity > MAX_POOL_CORES {
            return Err(HostPoolError::CapacityTooLarge {
                cores: total_capacity,
                max: MAX_POOL_CORES,
            });
        }
        if total_capacity == 0 {
            return Err(HostPoolError::ZeroCapacity);
        }

        let hosts: Vec<HostSlots> = entries
            .into_iter()
            .map(|entry| HostSlots {
                permits: Arc::new(Semaphore::new(entry.cores)),
                entry,
                active: AtomicUsize::new(0),
                total_dispatched: AtomicU64::new(0),
            })
            .collect();

        Ok(Self {
            inner: Arc::new(PoolInner {
                capacity: Arc::new(Semaphore::new(total_capacity)),
                total_capacity,
                hosts,
            }),
        })
    }

    /// Sum of cores across all hosts.
    pub fn total_capacity(&self) -> usize {
        self.inner.total_capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.inner.capacity.available_permits()
    }

    /// Waits until a slot is free and claims it on the least loaded host.
    pub async fn acquire(&self) -> Result<SlotHandle, HostPoolError> {
        let capacity_permit = Arc::clone(&self.inner.capacity)
            .acquire_owned()
            .await
            .map_err(|_| HostPoolError::Closed)?;

        // Holding a capacity permit guarantees some host has a free core, but
        // another acquirer may take it between the check and the claim.
        loop {
            let mut order: Vec<usize> = (0..self.inner.hosts.len()).collect();
            order.sort_by_key(|&i| Reverse(self.inner.hosts[i].permits.available_permits()));

            for index in order {
                let host = &self.inner.hosts[index];
                if let Ok(host_permit) = Arc::clone(&host.permits).try_acquire_owned() {
                    host.active.fetch_add(1, Ordering::Relaxed);
                    host.total_dispatched.fetch_add(1, Ordering::Relaxed);
                    debug!(host = %host.entry.name, "Acquired job slot");
                    return Ok(SlotHandle {
                        host_index: index,
                        pool: Arc::clone(&self.inner),
                        _host_permit: host_permit,
                        _capacity_permit: capacity_permit,
                    });
                }
            }

            tokio::task::yield_now().await;
        }
    }

    /// Returns a slot to the pool.
    pub fn release(&self, handle: SlotHandle) {
        debug!(host = %handle.host(), "Released job slot");
        drop(handle);
    }

    /// Closes the pool; pending and future acquisitions fail.
    pub fn close(&self) {
        self.inner.capacity.close();
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            total_capacity: self.inner.total_capacity,
            available: self.available(),
            hosts: self
                .inner
                .hosts
                .iter()
                .map(|h| HostStatus {
                    name: h.entry.name.clone(),
                    cores: h.entry.cores,
                    active_jobs: h.active.load(Ordering::Relaxed),
                    total_dispatched: h.total_dispatched.load(Ordering::Relaxed),
                })
                .collect(),
        }
    }
}
