//! Types for the tracker module.

use std::path::PathBuf;

use thiserror::Error;

use crate::hosts::HostPoolError;
use crate::job::{Job, JobStatus, RunStateError};

/// Errors that abort a tracked run.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Run state could not be read or written.
    #[error(transparent)]
    RunState(#[from] RunStateError),

    /// The host pool refused to hand out slots.
    #[error("host pool error: {0}")]
    HostPool(#[from] HostPoolError),

    /// The log directory could not be created.
    #[error("cannot create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A job task panicked.
    #[error("job task panicked: {0}")]
    TaskPanicked(String),
}

/// Final state of every job of a run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Unique id of this run.
    pub run_id: String,
    /// All jobs of the plan, in plan order.
    pub jobs: Vec<Job>,
    /// Jobs found done in the run state and not executed again.
    pub resumed: usize,
    /// Whether the run was stopped before all jobs were dispatched.
    pub stopped: bool,
}

impl RunResult {
    fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    pub fn done(&self) -> usize {
        self.count(JobStatus::Done)
    }

    pub fn failed(&self) -> usize {
        self.count(JobStatus::Failed)
    }

    /// Jobs that did not reach a terminal status.
    pub fn pending(&self) -> usize {
        self.jobs.iter().filter(|j| !j.status.is_terminal()).count()
    }

    /// Jobs that ended failed after exhausting their attempts.
    pub fn failed_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.status == JobStatus::Failed)
    }

    /// Whether the run counts as successful.
    ///
    /// Every job must be terminal. Failed jobs are only acceptable when
    /// `tolerate_failures` is set.
    pub fn is_success(&self, tolerate_failures: bool) -> bool {
        self.pending() == 0 && (tolerate_failures || self.failed() == 0)
    }
}
