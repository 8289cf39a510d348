//! Sensors, the registry they are declared in, and the pairs derived from it.
//!
//! A sensor is a named data source with a validity period. The registry keeps
//! two unordered sets, primary and secondary, and hands them out sorted by
//! period start, most recent first. Pairs are recomputed from the registry on
//! every run and never stored.

mod pairing;
mod registry;
mod types;

pub use pairing::compute_pairs;
pub use registry::SensorRegistry;
pub use types::{Sensor, SensorPair, SensorRole};
