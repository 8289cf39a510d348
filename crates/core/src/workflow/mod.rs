//! Workflow façade: sensor declarations in, ingestion and matchup runs out.
//!
//! A [`Workflow`] composes the sensor registry, the planner, the host pool and
//! the job tracker. Configuration problems surface as
//! [`WorkflowError::Configuration`] before any job runs; job failures are
//! only visible in the returned report.

mod error;
mod orchestrator;
mod types;

pub use error::{ConfigurationError, WorkflowError};
pub use orchestrator::Workflow;
pub use types::{Plan, RunOptions, WorkflowRun};
