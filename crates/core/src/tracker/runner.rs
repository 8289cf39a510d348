//! Job tracker implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::executor::{JobDescriptor, JobExecutor, RunContext};
use crate::hosts::{HostPool, SlotHandle};
use crate::job::{Job, JobRecord, JobStatus, RunStateStore};

use super::config::RetryConfig;
use super::control::RunControl;
use super::types::{RunResult, TrackerError};

/// Runs job lists over a host pool with retries and persisted state.
pub struct JobTracker {
    inner: Arc<TrackerInner>,
}

/// State shared with every spawned job task.
struct TrackerInner {
    executor: Arc<dyn JobExecutor>,
    store: Arc<dyn RunStateStore>,
    retry: RetryConfig,
    context: RunContext,
    control: RunControl,
}

type TaskOutput = (usize, Result<Job, TrackerError>);

impl JobTracker {
    pub fn new(
        executor: Arc<dyn JobExecutor>,
        store: Arc<dyn RunStateStore>,
        retry: RetryConfig,
        context: RunContext,
        control: RunControl,
    ) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                executor,
                store,
                retry,
                context,
                control,
            }),
        }
    }

    pub fn control(&self) -> &RunControl {
        &self.inner.control
    }

    /// Runs `jobs` to completion, or until the run is stopped.
    ///
    /// Jobs recorded as done are not executed again. Jobs recorded as
    /// running, pending or failed start over with a fresh attempt budget.
    /// A run state write failure aborts the run after the jobs already on a
    /// host have finished.
    pub async fn run(
        &self,
        jobs: Vec<Job>,
        hosts: &HostPool,
        log_dir: &Path,
    ) -> Result<RunResult, TrackerError> {
        let run_id = Uuid::new_v4().to_string();
        std::fs::create_dir_all(log_dir).map_err(|source| TrackerError::LogDir {
            path: log_dir.to_path_buf(),
            source,
        })?;

        let mut jobs = jobs;
        let resumed = self.restore(&mut jobs)?;
        let to_run: Vec<usize> = jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.status != JobStatus::Done)
            .map(|(idx, _)| idx)
            .collect();

        info!(
            run_id = %run_id,
            usecase = %self.inner.context.usecase,
            total = jobs.len(),
            resumed,
            to_run = to_run.len(),
            capacity = hosts.total_capacity(),
            executor = self.inner.executor.name(),
            "Starting run"
        );

        let control = &self.inner.control;
        let log_dir = Arc::new(log_dir.to_path_buf());
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut fatal: Option<TrackerError> = None;

        for idx in to_run {
            while let Some(joined) = tasks.try_join_next() {
                Self::collect(joined, &mut jobs, &mut fatal);
            }
            if fatal.is_some() || control.is_stopped() {
                break;
            }

            let slot = tokio::select! {
                biased;
                _ = control.stopped() => break,
                slot = hosts.acquire() => slot,
            };
            let slot = match slot {
                Ok(slot) => slot,
                Err(e) => {
                    fatal.get_or_insert(e.into());
                    break;
                }
            };

            let job = jobs[idx].clone();
            debug!(job_id = %job.id, host = %slot.host(), "Dispatching job");
            let inner = Arc::clone(&self.inner);
            let log_dir = Arc::clone(&log_dir);
            tasks.spawn(async move { (idx, inner.run_job(job, slot, &log_dir).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            Self::collect(joined, &mut jobs, &mut fatal);
        }
        for host in hosts.status().hosts {
            debug!(host = %host.name, dispatched = host.total_dispatched, "Host usage");
        }

        if let Some(e) = fatal {
            error!(run_id = %run_id, error = %e, "Run aborted");
            return Err(e);
        }

        let result = RunResult {
            run_id,
            jobs,
            resumed,
            stopped: control.is_stopped(),
        };
        info!(
            run_id = %result.run_id,
            done = result.done(),
            failed = result.failed(),
            pending = result.pending(),
            stopped = result.stopped,
            "Run finished"
        );
        Ok(result)
    }

    /// Applies stored records to the plan. Returns the number of done jobs.
    fn restore(&self, jobs: &mut [Job]) -> Result<usize, TrackerError> {
        let records = self.inner.store.load()?;
        let mut resumed = 0;

        for job in jobs.iter_mut() {
            let Some(record) = records.get(&job.id) else {
                continue;
            };
            job.log_path = record.log_path.clone();
            match record.status {
                JobStatus::Done => {
                    job.status = JobStatus::Done;
                    job.attempts = record.attempts;
                    resumed += 1;
                }
                JobStatus::Running => {
                    warn!(job_id = %job.id, "Job was left running by an earlier run, rerunning");
                }
                JobStatus::Pending | JobStatus::Failed => {}
            }
        }

        Ok(resumed)
    }

    fn collect(
        joined: Result<TaskOutput, JoinError>,
        jobs: &mut [Job],
        fatal: &mut Option<TrackerError>,
    ) {
        match joined {
            Ok((idx, Ok(job))) => jobs[idx] = job,
            Ok((idx, Err(e))) => {
                error!(job_id = %jobs[idx].id, error = %e, "Job aborted");
                fatal.get_or_insert(e);
            }
            Err(e) => {
                fatal.get_or_insert(TrackerError::TaskPanicked(e.to_string()));
            }
        }
    }
}

impl TrackerInner {
    /// Runs one job on its host until it succeeds, exhausts its attempts or
    /// the run is stopped. The slot is held for the whole time.
    async fn run_job(
        &self,
        mut job: Job,
        slot: SlotHandle,
        log_dir: &Path,
    ) -> Result<Job, TrackerError> {
        let host = slot.host().to_string();
        let log_path: PathBuf = log_dir.join(format!("{}.log", job.id.file_stem()));

        loop {
            job.attempts += 1;
            job.status = JobStatus::Running;
            job.log_path = Some(log_path.clone());
            self.persist(&job)?;

            let descriptor =
                JobDescriptor::new(&job, &host, job.attempts, log_path.clone(), &self.context);
            let failure = match self.executor.execute(&descriptor).await {
                Ok(outcome) if outcome.success => {
                    job.status = JobStatus::Done;
                    job.log_path = Some(outcome.log_path);
                    self.persist(&job)?;
                    info!(
                        job_id = %job.id,
                        host = %host,
                        attempt = job.attempts,
                        duration_ms = outcome.duration_ms,
                        "Job done"
                    );
                    return Ok(job);
                }
                Ok(outcome) => outcome
                    .message
                    .unwrap_or_else(|| "execution unit reported failure".to_string()),
                Err(e) => e.to_string(),
            };

            // A stop outranks the attempt budget: the job is left for the next run.
            if self.control.is_stopped() {
                return self.park(job, &failure);
            }

            if job.attempts >= self.retry.max_attempts {
                job.status = JobStatus::Failed;
                self.persist(&job)?;
                error!(
                    job_id = %job.id,
                    host = %host,
                    attempts = job.attempts,
                    error = %failure,
                    "Job failed, no attempts left"
                );
                return Ok(job);
            }

            let delay = self.retry.delay_for(job.attempts);
            warn!(
                job_id = %job.id,
                host = %host,
                attempt = job.attempts,
                max_attempts = self.retry.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Job attempt failed, retrying"
            );

            if !delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.control.stopped() => return self.park(job, &failure),
                }
            }
        }
    }

    /// Leaves a failed job pending for a later run.
    fn park(&self, mut job: Job, failure: &str) -> Result<Job, TrackerError> {
        job.status = JobStatus::Pending;
        self.persist(&job)?;
        info!(job_id = %job.id, error = %failure, "Run stopped, job left pending");
        Ok(job)
    }

    fn persist(&self, job: &Job) -> Result<(), TrackerError> {
        self.store.save(&JobRecord::from(job))?;
        Ok(())
    }
}
