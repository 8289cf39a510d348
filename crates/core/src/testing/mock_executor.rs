//! Mock executor for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::executor::{ExecutionError, ExecutionOutcome, JobDescriptor, JobExecutor};
use crate::job::JobId;

/// A recorded execution for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedExecution {
    /// The descriptor the job was executed with.
    pub descriptor: JobDescriptor,
    /// Whether the attempt succeeded.
    pub success: bool,
}

/// Scripted failures for one job.
#[derive(Debug, Clone, Copy)]
enum FailurePlan {
    Times(u32),
    Always,
}

/// Mock implementation of the JobExecutor trait.
///
/// Provides controllable behavior for testing:
/// - Track executions for assertions
/// - Fail a job a given number of times, or always
/// - Simulate execution time
/// - Observe the highest number of jobs running at once
///
/// # Example
///
/// ```rust,ignore
/// use sensorplan_core::testing::MockExecutor;
///
/// let executor = MockExecutor::new();
/// executor.fail_times(&job_id, 2).await;
///
/// // Run the tracker...
///
/// assert_eq!(executor.calls_for(&job_id).await, 3);
/// ```
#[derive(Debug)]
pub struct MockExecutor {
    /// Recorded executions.
    executions: Arc<RwLock<Vec<RecordedExecution>>>,
    /// Scripted failures by job id.
    failures: Arc<RwLock<HashMap<JobId, FailurePlan>>>,
    /// If set, the next execution will fail with this error.
    next_error: Arc<RwLock<Option<ExecutionError>>>,
    /// Simulated execution duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    /// Create a new mock executor where every job succeeds immediately.
    pub fn new() -> Self {
        Self {
            executions: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            duration_ms: Arc::new(RwLock::new(0)),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
        }
    }

    /// Get all recorded executions.
    pub async fn recorded_executions(&self) -> Vec<RecordedExecution> {
        self.executions.read().await.clone()
    }

    /// Get the number of executions performed.
    pub async fn call_count(&self) -> usize {
        self.executions.read().await.len()
    }

    /// Get the number of attempts made for one job.
    pub async fn calls_for(&self, job_id: &JobId) -> usize {
        self.executions
            .read()
            .await
            .iter()
            .filter(|e| &e.descriptor.job_id == job_id)
            .count()
    }

    /// Make the next `times` attempts of a job fail.
    pub async fn fail_times(&self, job_id: &JobId, times: u32) {
        self.failures
            .write()
            .await
            .insert(job_id.clone(), FailurePlan::Times(times));
    }

    /// Make every attempt of a job fail.
    pub async fn always_fail(&self, job_id: &JobId) {
        self.failures
            .write()
            .await
            .insert(job_id.clone(), FailurePlan::Always);
    }

    /// Configure the next execution to fail with the given error.
    pub async fn set_next_error(&self, error: ExecutionError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated execution duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Highest number of executions observed running at the same time.
    pub fn max_concurrency(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// Whether the scripted failures call for this attempt to fail.
    async fn should_fail(&self, job_id: &JobId) -> bool {
        let mut failures = self.failures.write().await;
        match failures.get_mut(job_id) {
            Some(FailurePlan::Always) => true,
            Some(FailurePlan::Times(remaining)) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    async fn record(&self, descriptor: &JobDescriptor, success: bool) {
        self.executions.write().await.push(RecordedExecution {
            descriptor: descriptor.clone(),
            success,
        });
    }
}

#[async_trait]
impl JobExecutor for MockExecutor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, job: &JobDescriptor) -> Result<ExecutionOutcome, ExecutionError> {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(running, Ordering::SeqCst);

        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }

        let result = if let Some(error) = self.next_error.write().await.take() {
            Err(error)
        } else if self.should_fail(&job.job_id).await {
            Ok(ExecutionOutcome::failed(
                job.log_path.clone(),
                "mock failure",
            ))
        } else {
            let mut outcome = ExecutionOutcome::succeeded(job.log_path.clone());
            outcome.duration_ms = duration_ms;
            Ok(outcome)
        };

        let success = matches!(&result, Ok(outcome) if outcome.success);
        self.record(job, success).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
