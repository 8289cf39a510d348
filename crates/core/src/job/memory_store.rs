//! In-memory run state store, used for dry runs and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use super::store::{JobRecord, RunStateError, RunStateStore};
use super::types::JobId;

/// Run state kept in memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryRunStateStore {
    records: RwLock<HashMap<JobId, JobRecord>>,
}

impl MemoryRunStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with records.
    pub fn with_records(records: impl IntoIterator<Item = JobRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.job_id.clone(), r))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RunStateStore for MemoryRunStateStore {
    fn load(&self) -> Result<HashMap<JobId, JobRecord>, RunStateError> {
        Ok(self.records.read().unwrap().clone())
    }

    fn get(&self, job_id: &JobId) -> Result<Option<JobRecord>, RunStateError> {
        Ok(self.records.read().unwrap().get(job_id).cloned())
    }

    fn save(&self, record: &JobRecord) -> Result<(), RunStateError> {
        self.records
            .write()
            .unwrap()
            .insert(record.job_id.clone(), record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), RunStateError> {
        self.records.write().unwrap().clear();
        Ok(())
    }
}
