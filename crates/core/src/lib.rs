pub mod config;
pub mod executor;
pub mod hosts;
pub mod job;
pub mod period;
pub mod planner;
pub mod sensor;
pub mod testing;
pub mod tracker;
pub mod workflow;

pub use config::{
    load_config, load_config_from_str, validate_config, ConfigError, WorkflowConfig,
};
pub use executor::{
    CommandExecutor, DryRunExecutor, ExecutionError, ExecutionOutcome, ExecutorConfig,
    JobDescriptor, JobExecutor,
};
pub use hosts::{HostEntry, HostPool, HostPoolError};
pub use job::{
    Job, JobId, JobKind, JobStatus, MemoryRunStateStore, RunStateError, RunStateStore,
    SqliteRunStateStore,
};
pub use period::{Period, PeriodError};
pub use planner::{next_time_slot, resolve_effective_window, time_slots, PlanError, TimeSlot};
pub use sensor::{compute_pairs, Sensor, SensorPair, SensorRegistry, SensorRole};
pub use tracker::{JobTracker, RetryConfig, RunControl, RunReport, RunResult, TrackerError};
pub use workflow::{ConfigurationError, Plan, RunOptions, Workflow, WorkflowError, WorkflowRun};
