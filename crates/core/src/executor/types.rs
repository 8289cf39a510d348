//! Types for the executor module.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobId, JobKind, JobTarget};
use crate::period::Period;

/// Run-wide settings handed to every job, opaque to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Usecase name of the run.
    pub usecase: String,
    /// Usecase configuration reference, matchup only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usecase_config: Option<String>,
    /// Configuration directory of the processing tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,
    /// Sampling hint for matchup jobs.
    pub samples_per_time_slot: u32,
}

/// Everything an execution unit needs to run one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub job_id: JobId,
    pub slot: Period,
    pub target: JobTarget,
    /// Host the job was assigned to.
    pub host: String,
    /// 1-based attempt number within the current run.
    pub attempt: u32,
    /// Where the execution unit should write its log.
    pub log_path: PathBuf,
    pub context: RunContext,
}

impl JobDescriptor {
    pub fn new(job: &Job, host: &str, attempt: u32, log_path: PathBuf, context: &RunContext) -> Self {
        Self {
            job_id: job.id.clone(),
            slot: job.slot,
            target: job.target.clone(),
            host: host.to_string(),
            attempt,
            log_path,
            context: context.clone(),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.target.kind()
    }
}

/// What a finished execution reported back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// The log artifact written by the execution unit.
    pub log_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    pub fn succeeded(log_path: PathBuf) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            log_path,
            message: None,
            duration_ms: 0,
        }
    }

    pub fn failed(log_path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            log_path,
            message: Some(message.into()),
            duration_ms: 0,
        }
    }
}
