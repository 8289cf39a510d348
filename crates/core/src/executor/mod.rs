//! Execution units: the opaque per-job work behind the scheduler.
//!
//! The scheduler only needs [`JobExecutor::execute`]. Two implementations
//! ship with the crate:
//! - [`CommandExecutor`] launches the external ingestion or matchup program;
//! - [`DryRunExecutor`] logs what would run and succeeds immediately.
//!
//! Tests use `testing::MockExecutor`.

mod command;
mod config;
mod dry_run;
mod error;
mod traits;
mod types;

pub use command::CommandExecutor;
pub use config::{CommandSpec, ExecutorConfig};
pub use dry_run::DryRunExecutor;
pub use error::ExecutionError;
pub use traits::JobExecutor;
pub use types::{ExecutionOutcome, JobDescriptor, RunContext};
