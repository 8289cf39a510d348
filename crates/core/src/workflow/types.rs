//! Types for the workflow module.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::job::{Job, JobKind};
use crate::period::Period;
use crate::sensor::{Sensor, SensorPair};
use crate::tracker::{RunReport, RunResult};

/// Per-run options of the execution surface.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory receiving job logs and the report.
    pub log_dir: PathBuf,
    /// Log what would run instead of running it.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("log"),
            dry_run: false,
        }
    }
}

impl RunOptions {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// The jobs of a run before anything executes.
#[derive(Debug, Clone)]
pub struct Plan {
    pub kind: JobKind,
    /// Hull of the windows the jobs cover.
    pub window: Period,
    /// Sensors ingested (ingestion plans only).
    pub sensors: Vec<Sensor>,
    /// Sensor pairs matched (matchup plans only).
    pub pairs: Vec<SensorPair>,
    pub jobs: Vec<Job>,
}

impl Plan {
    /// Number of distinct time slots across all jobs.
    pub fn slot_count(&self) -> usize {
        self.jobs
            .iter()
            .map(|job| (job.slot.start(), job.slot.end()))
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

/// Outcome of a workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub result: RunResult,
    pub report: RunReport,
    pub report_path: PathBuf,
}

impl WorkflowRun {
    pub fn is_success(&self, tolerate_failures: bool) -> bool {
        self.result.is_success(tolerate_failures)
    }
}
