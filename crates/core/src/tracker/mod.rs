//! Job tracker: runs a job list over the host pool and keeps run state.
//!
//! The tracker:
//! - skips jobs already recorded as done (resume);
//! - dispatches the rest as host slots free up;
//! - retries failed attempts with backoff up to the configured budget;
//! - persists every status change before moving on.

mod config;
mod control;
mod report;
mod runner;
mod types;

pub use config::RetryConfig;
pub use control::RunControl;
pub use report::{plan_digest, ReportLine, RunReport};
pub use runner::JobTracker;
pub use types::{RunResult, TrackerError};
