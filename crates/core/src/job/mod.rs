//! Jobs and their persisted run state.
//!
//! A [`Job`] is one schedulable unit of work: a time slot combined with an
//! ingestion sensor or a matchup pair. Its [`JobId`] is derived from that
//! combination only, so the same plan yields the same ids on every run and the
//! [`RunStateStore`] can be consulted to resume.

mod memory_store;
mod sqlite_store;
mod store;
mod types;

pub use memory_store::MemoryRunStateStore;
pub use sqlite_store::SqliteRunStateStore;
pub use store::{JobRecord, RunStateError, RunStateStore};
pub use types::{build_jobs, build_pair_jobs, Job, JobId, JobKind, JobStatus, JobTarget};
