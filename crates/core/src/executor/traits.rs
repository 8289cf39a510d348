//! Trait definitions for the executor module.

use async_trait::async_trait;

use super::error::ExecutionError;
use super::types::{ExecutionOutcome, JobDescriptor};

/// Runs a single job to completion.
///
/// An `Err` and an outcome with `success == false` both count as one failed
/// attempt; the caller decides about retries.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Returns the name of this executor implementation.
    fn name(&self) -> &str;

    /// Executes the job described by `job` and waits for it to finish.
    async fn execute(&self, job: &JobDescriptor) -> Result<ExecutionOutcome, ExecutionError>;
}
