//! Run state storage trait and types.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Job, JobId, JobStatus};

/// Errors raised by run state stores.
#[derive(Debug, Error)]
pub enum RunStateError {
    /// The backing database could not be opened, read or written.
    #[error("run state database error: {0}")]
    Database(String),

    /// A stored record could not be understood.
    #[error("corrupt run state record for job {job_id}: {reason}")]
    Corrupt { job_id: String, reason: String },
}

/// Persisted status of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub status: JobStatus,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Job> for JobRecord {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status,
            attempts: job.attempts,
            log_path: job.log_path.clone(),
            updated_at: Utc::now(),
        }
    }
}

/// Durable per-job status, read once when a run starts and written after
/// every job state change.
///
/// Records are keyed by [`JobId`]; implementations must make `save` an upsert
/// of that single key so concurrent jobs never overwrite each other.
pub trait RunStateStore: Send + Sync {
    /// Load every stored record.
    fn load(&self) -> Result<HashMap<JobId, JobRecord>, RunStateError>;

    /// Get the record of one job.
    fn get(&self, job_id: &JobId) -> Result<Option<JobRecord>, RunStateError>;

    /// Insert or replace the record of one job.
    fn save(&self, record: &JobRecord) -> Result<(), RunStateError>;

    /// Remove every record.
    fn clear(&self) -> Result<(), RunStateError>;
}
