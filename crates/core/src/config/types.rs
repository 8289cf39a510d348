use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::executor::ExecutorConfig;
use crate::hosts::HostEntry;
use crate::job::SqliteRunStateStore;
use crate::period::{Period, PeriodError};
use crate::sensor::Sensor;
use crate::tracker::RetryConfig;

/// Root configuration of a workflow file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Usecase name; names the state database and the report.
    pub usecase: String,
    #[serde(default = "default_time_slot_days")]
    pub time_slot_days: u32,
    /// Sampling hint passed through to matchup jobs.
    #[serde(default = "default_samples_per_time_slot")]
    pub samples_per_time_slot: u32,
    #[serde(default)]
    pub production_period: Option<PeriodConfig>,
    /// Opaque usecase configuration reference for matchup jobs.
    #[serde(default)]
    pub usecase_config: Option<String>,
    /// Configuration directory of the processing tools.
    #[serde(default)]
    pub config_dir: Option<PathBuf>,
    #[serde(default)]
    pub primary_sensors: Vec<SensorConfig>,
    #[serde(default)]
    pub secondary_sensors: Vec<SensorConfig>,
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

impl WorkflowConfig {
    /// Where the run state of this usecase lives.
    pub fn state_db_path(&self) -> PathBuf {
        SqliteRunStateStore::path_for(&self.run.state_dir, &self.usecase)
    }
}

fn default_time_slot_days() -> u32 {
    7
}

fn default_samples_per_time_slot() -> u32 {
    50000
}

/// A period given as two ISO dates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeriodConfig {
    pub start: String,
    pub end: String,
}

impl PeriodConfig {
    pub fn to_period(&self) -> Result<Period, PeriodError> {
        Period::parse(&self.start, &self.end)
    }
}

/// A sensor declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SensorConfig {
    pub name: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl SensorConfig {
    pub fn to_sensor(&self) -> Result<Sensor, PeriodError> {
        let sensor = Sensor::new(self.name.clone(), Period::parse(&self.start, &self.end)?);
        Ok(match &self.version {
            Some(version) => sensor.with_version(version.clone()),
            None => sensor,
        })
    }
}

/// Run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// Directory receiving job logs and the report.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Directory holding the run state database.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Count a run with terminally failed jobs as successful.
    #[serde(default)]
    pub tolerate_failures: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            state_dir: default_state_dir(),
            tolerate_failures: false,
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}
