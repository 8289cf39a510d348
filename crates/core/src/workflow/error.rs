//! Error types for the workflow module.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::hosts::HostPoolError;
use crate::job::{JobKind, RunStateError};
use crate::period::PeriodError;
use crate::planner::PlanError;
use crate::tracker::TrackerError;

/// Problems with the declared workflow. Always raised before any job runs.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no {0} sensors declared")]
    NoSensors(&'static str),

    #[error("no primary/secondary sensor pair overlaps in time")]
    NoSensorPairs,

    #[error("no execution unit configured")]
    NoExecutor,

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    HostPool(#[from] HostPoolError),

    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Top-level workflow error.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Fatal configuration problem.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Run state unreadable, corrupt or unwritable.
    #[error("run state error: {0}")]
    RunState(#[from] RunStateError),

    /// The run could not be carried out.
    #[error("{kind} run failed: {source}")]
    Tracker {
        kind: JobKind,
        #[source]
        source: TrackerError,
    },

    /// The report could not be written.
    #[error("cannot write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    /// Maps a tracker error of a `kind` run into the workflow taxonomy.
    pub(crate) fn from_tracker(kind: JobKind, error: TrackerError) -> Self {
        match error {
            TrackerError::RunState(e) => WorkflowError::RunState(e),
            TrackerError::HostPool(e) => ConfigurationError::HostPool(e).into(),
            other => WorkflowError::Tracker {
                kind,
                source: other,
            },
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, WorkflowError::Configuration(_))
    }
}

impl From<PlanError> for WorkflowError {
    fn from(e: PlanError) -> Self {
        ConfigurationError::Plan(e).into()
    }
}

impl From<PeriodError> for WorkflowError {
    fn from(e: PeriodError) -> Self {
        ConfigurationError::Period(e).into()
    }
}

impl From<HostPoolError> for WorkflowError {
    fn from(e: HostPoolError) -> Self {
        ConfigurationError::HostPool(e).into()
    }
}

impl From<ConfigError> for WorkflowError {
    fn from(e: ConfigError) -> Self {
        ConfigurationError::Config(e).into()
    }
}
