//! Error types for the executor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::job::JobKind;

/// Errors that prevent a job from being executed or awaited.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// No program is configured for this kind of job.
    #[error("no {kind} program configured")]
    ProgramNotConfigured { kind: JobKind },

    /// The configured program does not exist.
    #[error("program not found: {path}")]
    ProgramNotFound { path: PathBuf },

    /// The program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file could not be created.
    #[error("failed to create log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job exceeded the configured timeout and was killed.
    #[error("job timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while waiting for the job.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
