//! Testing utilities and mock implementations.
//!
//! [`MockExecutor`] stands in for the external processing programs so that
//! planning and tracking can be tested end to end without a cluster.
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorplan_core::testing::{fixtures, MockExecutor};
//!
//! let executor = Arc::new(MockExecutor::new());
//! let mut workflow = fixtures::workflow("usecase-test").with_executor(executor.clone());
//! workflow.add_primary_sensor("mhs-n19", "2009-04-01", "2009-04-30", None)?;
//! ```

mod mock_executor;

pub use mock_executor::{MockExecutor, RecordedExecution};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::executor::RunContext;
    use crate::hosts::{HostEntry, HostPool};
    use crate::period::Period;
    use crate::sensor::Sensor;
    use crate::workflow::Workflow;

    /// Parse a period, panicking on bad input.
    pub fn period(start: &str, end: &str) -> Period {
        Period::parse(start, end).expect("fixture period must be valid")
    }

    /// Create a sensor without a version.
    pub fn sensor(name: &str, start: &str, end: &str) -> Sensor {
        Sensor::new(name, period(start, end))
    }

    /// The three AVHRR sensors used throughout the tests.
    pub fn avhrr_family() -> Vec<Sensor> {
        vec![
            sensor("avhrr.n10", "1986-11-17", "1991-09-16"),
            sensor("avhrr.n11", "1988-11-08", "1994-12-31"),
            sensor("avhrr.n12", "1991-09-16", "1998-12-14"),
        ]
    }

    /// Run context with defaults.
    pub fn run_context(usecase: &str) -> RunContext {
        RunContext {
            usecase: usecase.to_string(),
            usecase_config: None,
            config_dir: None,
            samples_per_time_slot: 50000,
        }
    }

    /// A pool of one host with the given core count.
    pub fn local_pool(cores: usize) -> HostPool {
        HostPool::new([HostEntry::new("localhost", cores)]).expect("fixture pool must have cores")
    }

    /// A workflow with a 7-day slot.
    pub fn workflow(usecase: &str) -> Workflow {
        Workflow::new(usecase, 7)
    }
}
