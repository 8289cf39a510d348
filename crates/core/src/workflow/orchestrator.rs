//! Workflow orchestrator implementation.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{validate_config, WorkflowConfig};
use crate::executor::{CommandExecutor, DryRunExecutor, JobExecutor, RunContext};
use crate::hosts::{HostEntry, HostPool};
use crate::job::{
    build_jobs, build_pair_jobs, JobKind, JobStatus, JobTarget, MemoryRunStateStore, RunStateStore,
};
use crate::period::Period;
use crate::planner::{resolve_effective_window, resolve_sensor_window, time_slots, TimeSlot};
use crate::sensor::{compute_pairs, Sensor, SensorRegistry, SensorRole};
use crate::tracker::{JobTracker, RetryConfig, RunControl, RunReport};

use super::error::{ConfigurationError, WorkflowError};
use super::types::{Plan, RunOptions, WorkflowRun};

/// Default sampling hint for matchup jobs.
pub const DEFAULT_SAMPLES_PER_TIME_SLOT: u32 = 50000;

/// Declarations and collaborators of one usecase.
pub struct Workflow {
    usecase: String,
    time_slot_days: u32,
    samples_per_time_slot: u32,
    production_period: Option<Period>,
    usecase_config: Option<String>,
    config_dir: Option<PathBuf>,
    registry: SensorRegistry,
    executor: Option<Arc<dyn JobExecutor>>,
    state_store: Option<Arc<dyn RunStateStore>>,
    retry: RetryConfig,
    control: RunControl,
}

impl Workflow {
    pub fn new(usecase: impl Into<String>, time_slot_days: u32) -> Self {
        Self {
            usecase: usecase.into(),
            time_slot_days,
            samples_per_time_slot: DEFAULT_SAMPLES_PER_TIME_SLOT,
            production_period: None,
            usecase_config: None,
            config_dir: None,
            registry: SensorRegistry::new(),
            executor: None,
            state_store: None,
            retry: RetryConfig::default(),
            control: RunControl::new(),
        }
    }

    /// Builds a workflow from a loaded configuration.
    ///
    /// The command executor is wired from the `[executor]` section. The run
    /// state store is left to the caller.
    pub fn from_config(config: &WorkflowConfig) -> Result<Self, WorkflowError> {
        validate_config(config)?;

        let mut workflow = Self::new(config.usecase.clone(), config.time_slot_days)
            .with_retry(config.retry.clone())
            .with_executor(Arc::new(CommandExecutor::new(config.executor.clone())));
        workflow.set_samples_per_time_slot(config.samples_per_time_slot);

        if let Some(period) = &config.production_period {
            workflow.set_production_period(period.to_period()?);
        }
        if let Some(usecase_config) = &config.usecase_config {
            workflow.set_usecase_config(usecase_config.clone());
        }
        if let Some(config_dir) = &config.config_dir {
            workflow.set_config_dir(config_dir.clone());
        }
        for sensor in &config.primary_sensors {
            workflow.add_sensor(SensorRole::Primary, sensor.to_sensor()?);
        }
        for sensor in &config.secondary_sensors {
            workflow.add_sensor(SensorRole::Secondary, sensor.to_sensor()?);
        }

        Ok(workflow)
    }

    pub fn with_production_period(mut self, period: Period) -> Self {
        self.production_period = Some(period);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn JobExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_state_store(mut self, store: Arc<dyn RunStateStore>) -> Self {
        self.state_store = Some(store);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Shares a stop handle with the caller.
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    /// Declares a primary sensor from ISO dates.
    pub fn add_primary_sensor(
        &mut self,
        name: &str,
        start: &str,
        end: &str,
        version: Option<&str>,
    ) -> Result<(), WorkflowError> {
        let sensor = declared_sensor(name, start, end, version)?;
        self.add_sensor(SensorRole::Primary, sensor);
        Ok(())
    }

    /// Declares a secondary sensor from ISO dates.
    pub fn add_secondary_sensor(
        &mut self,
        name: &str,
        start: &str,
        end: &str,
        version: Option<&str>,
    ) -> Result<(), WorkflowError> {
        let sensor = declared_sensor(name, start, end, version)?;
        self.add_sensor(SensorRole::Secondary, sensor);
        Ok(())
    }

    pub fn add_sensor(&mut self, role: SensorRole, sensor: Sensor) {
        debug!(role = %role, sensor = %sensor, "Declared sensor");
        self.registry.add(role, sensor);
    }

    pub fn set_production_period(&mut self, period: Period) {
        self.production_period = Some(period);
    }

    pub fn set_samples_per_time_slot(&mut self, samples: u32) {
        self.samples_per_time_slot = samples;
    }

    pub fn set_usecase_config(&mut self, reference: impl Into<String>) {
        self.usecase_config = Some(reference.into());
    }

    pub fn set_config_dir(&mut self, dir: impl Into<PathBuf>) {
        self.config_dir = Some(dir.into());
    }

    pub fn usecase(&self) -> &str {
        &self.usecase
    }

    pub fn time_slot_days(&self) -> u32 {
        self.time_slot_days
    }

    pub fn samples_per_time_slot(&self) -> u32 {
        self.samples_per_time_slot
    }

    pub fn production_period(&self) -> Option<&Period> {
        self.production_period.as_ref()
    }

    pub fn usecase_config(&self) -> Option<&str> {
        self.usecase_config.as_deref()
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn control(&self) -> &RunControl {
        &self.control
    }

    /// Plans ingestion: one job per slot of every primary sensor.
    ///
    /// Each sensor is ingested over its own period clipped to the production
    /// period. Sensors outside the production period are skipped, unless no
    /// sensor is left.
    pub fn plan_ingestion(&self) -> Result<Plan, WorkflowError> {
        let primaries = self.registry.primary_sensors();
        if primaries.is_empty() {
            return Err(ConfigurationError::NoSensors("primary").into());
        }

        let mut jobs = Vec::new();
        let mut sensors = Vec::new();
        let mut window: Option<Period> = None;
        let mut last_error = None;

        for sensor in primaries {
            let sensor_window =
                match resolve_sensor_window(&sensor, self.production_period.as_ref()) {
                    Ok(w) => w,
                    Err(e) => {
                        warn!(sensor = %sensor.name(), error = %e, "Skipping sensor outside the production period");
                        last_error = Some(e);
                        continue;
                    }
                };

            let slots = self.slots(&sensor_window);
            jobs.extend(build_jobs(&slots, &[JobTarget::from(sensor.clone())]));
            window = Some(match window {
                Some(w) => w.hull(&sensor_window),
                None => sensor_window,
            });
            sensors.push(sensor);
        }

        let window = match (window, last_error) {
            (Some(window), _) => window,
            (None, Some(e)) => return Err(e.into()),
            (None, None) => return Err(ConfigurationError::NoSensors("primary").into()),
        };

        let plan = Plan {
            kind: JobKind::Ingestion,
            window,
            sensors,
            pairs: Vec::new(),
            jobs,
        };
        self.log_plan(&plan);
        Ok(plan)
    }

    /// Plans matchup: one job per (slot, sensor pair) over the effective window,
    /// each slot clipped to the pair's overlap.
    pub fn plan_matchup(&self) -> Result<Plan, WorkflowError> {
        if self.registry.is_empty() {
            return Err(ConfigurationError::NoSensors("primary or secondary").into());
        }

        let pairs = compute_pairs(
            &self.registry.primary_sensors(),
            &self.registry.secondary_sensors(),
        );
        if pairs.is_empty() {
            return Err(ConfigurationError::NoSensorPairs.into());
        }

        let window = resolve_effective_window(self.production_period.as_ref(), &self.registry)?
            .ok_or(ConfigurationError::NoSensors("primary or secondary"))?;

        let slots = self.slots(&window);
        let jobs = build_pair_jobs(&slots, &pairs);

        let plan = Plan {
            kind: JobKind::Matchup,
            window,
            sensors: Vec::new(),
            pairs,
            jobs,
        };
        self.log_plan(&plan);
        Ok(plan)
    }

    pub fn plan(&self, kind: JobKind) -> Result<Plan, WorkflowError> {
        match kind {
            JobKind::Ingestion => self.plan_ingestion(),
            JobKind::Matchup => self.plan_matchup(),
        }
    }

    pub async fn run_ingestion(
        &self,
        hosts: &[HostEntry],
        options: &RunOptions,
    ) -> Result<WorkflowRun, WorkflowError> {
        self.run(JobKind::Ingestion, hosts, options).await
    }

    pub async fn run_matchup(
        &self,
        hosts: &[HostEntry],
        options: &RunOptions,
    ) -> Result<WorkflowRun, WorkflowError> {
        self.run(JobKind::Matchup, hosts, options).await
    }

    /// Plans and runs `kind` jobs over `hosts`, then writes the report to
    /// `<log_dir>/<usecase>.report`.
    pub async fn run(
        &self,
        kind: JobKind,
        hosts: &[HostEntry],
        options: &RunOptions,
    ) -> Result<WorkflowRun, WorkflowError> {
        let plan = self.plan(kind)?;
        let pool = HostPool::new(hosts.iter().cloned())?;

        let (executor, store) = if options.dry_run {
            info!(usecase = %self.usecase, kind = %kind, "Dry run, nothing will be executed");
            let executor: Arc<dyn JobExecutor> = Arc::new(DryRunExecutor::new());
            let store: Arc<dyn RunStateStore> = Arc::new(MemoryRunStateStore::new());
            (executor, store)
        } else {
            let executor = self
                .executor
                .clone()
                .ok_or(ConfigurationError::NoExecutor)?;
            (executor, self.state_store())
        };

        let tracker = JobTracker::new(
            executor,
            store,
            self.retry.clone(),
            self.run_context(),
            self.control.clone(),
        );
        let result = tracker
            .run(plan.jobs, &pool, &options.log_dir)
            .await
            .map_err(|e| WorkflowError::from_tracker(kind, e))?;

        let report = RunReport::from_jobs(&result.run_id, &self.usecase, &result.jobs);
        let report_path = RunReport::path_for(&options.log_dir, &self.usecase);
        report
            .write_to(&report_path)
            .map_err(|source| WorkflowError::Report {
                path: report_path.clone(),
                source,
            })?;
        info!(
            usecase = %self.usecase,
            kind = %kind,
            report = %report_path.display(),
            done = report.done,
            failed = report.failed,
            pending = report.pending,
            "Report written"
        );

        Ok(WorkflowRun {
            result,
            report,
            report_path,
        })
    }

    /// Reports the persisted state of the `kind` plan without executing it.
    pub fn status(&self, kind: JobKind) -> Result<RunReport, WorkflowError> {
        let mut jobs = self.plan(kind)?.jobs;
        let records = self.state_store().load()?;

        for job in &mut jobs {
            if let Some(record) = records.get(&job.id) {
                job.status = match record.status {
                    JobStatus::Running => JobStatus::Pending,
                    status => status,
                };
                job.attempts = record.attempts;
                job.log_path = record.log_path.clone();
            }
        }

        Ok(RunReport::from_jobs("status", &self.usecase, &jobs))
    }

    fn state_store(&self) -> Arc<dyn RunStateStore> {
        match &self.state_store {
            Some(store) => Arc::clone(store),
            None => {
                warn!(usecase = %self.usecase, "No run state store configured, progress will not survive this process");
                Arc::new(MemoryRunStateStore::new())
            }
        }
    }

    fn run_context(&self) -> RunContext {
        RunContext {
            usecase: self.usecase.clone(),
            usecase_config: self.usecase_config.clone(),
            config_dir: self.config_dir.clone(),
            samples_per_time_slot: self.samples_per_time_slot,
        }
    }

    fn slots(&self, window: &Period) -> Vec<TimeSlot> {
        time_slots(window, self.time_slot_days).collect()
    }

    fn log_plan(&self, plan: &Plan) {
        info!(
            usecase = %self.usecase,
            kind = %plan.kind,
            window = %plan.window,
            slots = plan.slot_count(),
            sensors = plan.sensors.len(),
            pairs = plan.pairs.len(),
            jobs = plan.job_count(),
            "Planned run"
        );
    }
}

fn declared_sensor(
    name: &str,
    start: &str,
    end: &str,
    version: Option<&str>,
) -> Result<Sensor, WorkflowError> {
    let sensor = Sensor::new(name, Period::parse(start, end)?);
    Ok(match version {
        Some(version) => sensor.with_version(version),
        None => sensor,
    })
}
