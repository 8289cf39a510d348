//! Executor that only reports what would run.

use async_trait::async_trait;
use tracing::info;

use super::command::CommandExecutor;
use super::error::ExecutionError;
use super::traits::JobExecutor;
use super::types::{ExecutionOutcome, JobDescriptor};

/// Logs each job instead of running it and reports success.
///
/// Nothing is written to disk, the log path is passed through untouched.
#[derive(Debug, Default)]
pub struct DryRunExecutor;

impl DryRunExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JobExecutor for DryRunExecutor {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn execute(&self, job: &JobDescriptor) -> Result<ExecutionOutcome, ExecutionError> {
        info!(
            job_id = %job.job_id,
            host = %job.host,
            attempt = job.attempt,
            args = ?CommandExecutor::job_arguments(job),
            "Dry run: would execute job"
        );
        Ok(ExecutionOutcome::succeeded(job.log_path.clone()))
    }
}
