//! Executor that launches the external processing programs.

use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::{CommandSpec, ExecutorConfig};
use super::error::ExecutionError;
use super::traits::JobExecutor;
use super::types::{ExecutionOutcome, JobDescriptor};
use crate::job::JobTarget;

/// Environment variable carrying the assigned host to the launched program.
pub const HOST_ENV: &str = "SENSORPLAN_HOST";

/// Environment variable carrying the job id to the launched program.
pub const JOB_ID_ENV: &str = "SENSORPLAN_JOB_ID";

const TOOL_DATE_FORMAT: &str = "%Y-%j";

/// Runs each job as a child process.
///
/// Standard output and error go to the job's log file. A non-zero exit
/// status is a failed attempt, not an error.
pub struct CommandExecutor {
    config: ExecutorConfig,
}

impl CommandExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Command line arguments passed after the configured leading arguments.
    ///
    /// Slot bounds are passed as `yyyy-DDD` (year and day of year), the form
    /// the processing tools parse.
    pub fn job_arguments(job: &JobDescriptor) -> Vec<String> {
        let start = job.slot.start().format(TOOL_DATE_FORMAT).to_string();
        let end = job.slot.end().format(TOOL_DATE_FORMAT).to_string();
        let mut args = Vec::new();

        match &job.target {
            JobTarget::Ingestion { sensor } => {
                args.extend(["-s".to_string(), sensor.name().to_string()]);
                args.extend(["-start".to_string(), start, "-end".to_string(), end]);
                if let Some(version) = sensor.version() {
                    args.extend(["-v".to_string(), version.to_string()]);
                }
                push_config_dir(&mut args, job.context.config_dir.as_deref());
            }
            JobTarget::Matchup { pair } => {
                if let Some(usecase_config) = &job.context.usecase_config {
                    args.extend(["-u".to_string(), usecase_config.clone()]);
                }
                args.extend(["-p".to_string(), pair.primary_name().to_string()]);
                args.extend(["-s".to_string(), pair.secondary_name().to_string()]);
                args.extend(["-start".to_string(), start, "-end".to_string(), end]);
                push_config_dir(&mut args, job.context.config_dir.as_deref());
                args.extend([
                    "-samples".to_string(),
                    job.context.samples_per_time_slot.to_string(),
                ]);
            }
        }

        args
    }

    fn command_for(&self, job: &JobDescriptor) -> Result<&CommandSpec, ExecutionError> {
        self.config
            .command_for(job.kind())
            .ok_or(ExecutionError::ProgramNotConfigured { kind: job.kind() })
    }

    fn open_log(path: &Path) -> Result<(File, File), ExecutionError> {
        let log_error = |source| ExecutionError::LogFile {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(log_error)?;
        }
        let stdout = File::create(path).map_err(log_error)?;
        let stderr = stdout.try_clone().map_err(log_error)?;
        Ok((stdout, stderr))
    }
}

fn push_config_dir(args: &mut Vec<String>, config_dir: Option<&Path>) {
    if let Some(dir) = config_dir {
        args.extend(["-c".to_string(), dir.display().to_string()]);
    }
}

#[async_trait]
impl JobExecutor for CommandExecutor {
    fn name(&self) -> &str {
        "command"
    }

    async fn execute(&self, job: &JobDescriptor) -> Result<ExecutionOutcome, ExecutionError> {
        let spec = self.command_for(job)?;
        let (stdout, stderr) = Self::open_log(&job.log_path)?;

        let mut args = spec.args.clone();
        args.extend(Self::job_arguments(job));

        debug!(
            job_id = %job.job_id,
            host = %job.host,
            program = %spec.program.display(),
            args = ?args,
            "Launching job"
        );

        let started = Instant::now();
        let mut child = Command::new(&spec.program)
            .args(&args)
            .env(HOST_ENV, &job.host)
            .env(JOB_ID_ENV, job.job_id.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExecutionError::ProgramNotFound {
                        path: spec.program.clone(),
                    }
                } else {
                    ExecutionError::Spawn {
                        program: spec.program.clone(),
                        source: e,
                    }
                }
            })?;

        let status = match self.config.timeout_secs {
            Some(timeout_secs) => {
                match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
                    Ok(status) => status?,
                    Err(_) => {
                        let _ = child.kill().await;
                        warn!(job_id = %job.job_id, timeout_secs, "Job timed out, killed");
                        return Err(ExecutionError::Timeout { timeout_secs });
                    }
                }
            }
            None => child.wait().await?,
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let success = status.success();
        info!(
            job_id = %job.job_id,
            host = %job.host,
            exit_code = ?status.code(),
            duration_ms,
            "Job process exited"
        );

        Ok(ExecutionOutcome {
            success,
            exit_code: status.code(),
            log_path: job.log_path.clone(),
            message: (!success).then(|| format!("exited with {}", status)),
            duration_ms,
        })
    }
}
