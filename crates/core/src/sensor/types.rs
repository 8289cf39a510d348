//! Sensor and sensor pair types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::period::Period;

/// The role a sensor plays in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorRole {
    Primary,
    Secondary,
}

impl fmt::Display for SensorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorRole::Primary => write!(f, "primary"),
            SensorRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// A named data source bound to a validity period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sensor {
    name: String,
    period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl Sensor {
    pub fn new(name: impl Into<String>, period: Period) -> Self {
        Self {
            name: name.into(),
            period,
            version: None,
        }
    }

    /// Attaches a processing version tag.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Registry read order: latest start first, then by name.
    pub(crate) fn cmp_recent_first(&self, other: &Sensor) -> Ordering {
        other
            .period
            .start()
            .cmp(&self.period.start())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| other.period.end().cmp(&self.period.end()))
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} ({}) {}", self.name, version, self.period),
            None => write!(f, "{} {}", self.name, self.period),
        }
    }
}

/// Two sensors of different families together with the period both cover.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorPair {
    primary: Sensor,
    secondary: Sensor,
    overlap: Period,
}

impl SensorPair {
    /// Builds a pair, returning `None` when the sensors share a name or their
    /// periods do not overlap by at least one full day.
    pub fn new(primary: Sensor, secondary: Sensor) -> Option<Self> {
        if primary.name == secondary.name {
            return None;
        }
        let overlap = primary.period.intersection(&secondary.period)?;
        // Periods that merely touch at a boundary day carry no common data.
        if overlap.is_single_day() {
            return None;
        }
        Some(Self {
            primary,
            secondary,
            overlap,
        })
    }

    pub fn primary(&self) -> &Sensor {
        &self.primary
    }

    pub fn secondary(&self) -> &Sensor {
        &self.secondary
    }

    pub fn primary_name(&self) -> &str {
        &self.primary.name
    }

    pub fn secondary_name(&self) -> &str {
        &self.secondary.name
    }

    pub fn overlap(&self) -> &Period {
        &self.overlap
    }

    /// True when both pairs combine the same two sensor families, in any role.
    pub fn same_families(&self, other: &SensorPair) -> bool {
        (self.primary.name == other.primary.name && self.secondary.name == other.secondary.name)
            || (self.primary.name == other.secondary.name
                && self.secondary.name == other.primary.name)
    }

    /// Stable identity used in job ids, `primary+secondary`.
    pub fn key(&self) -> String {
        format!("{}+{}", self.primary.name, self.secondary.name)
    }
}

impl fmt::Display for SensorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} {}",
            self.primary.name, self.secondary.name, self.overlap
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(name: &str, start: &str, end: &str) -> Sensor {
        Sensor::new(name, Period::parse(start, end).unwrap())
    }

    #[test]
    fn test_sensor_equality_includes_version() {
        let a = sensor("mhs-n18", "2005-05-25", "2016-03-04");
        let b = sensor("mhs-n18", "2005-05-25", "2016-03-04").with_version("v1.0");
        assert_ne!(a, b);
        assert_eq!(b.version(), Some("v1.0"));
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_pair_overlap() {
        let pair = SensorPair::new(
            sensor("avhrr.n12", "1991-09-16", "1998-12-14"),
            sensor("avhrr.n11", "1988-11-08", "1994-12-31"),
        )
        .unwrap();
        assert_eq!(
            *pair.overlap(),
            Period::parse("1991-09-16", "1994-12-31").unwrap()
        );
        assert_eq!(pair.key(), "avhrr.n12+avhrr.n11");
    }

    #[test]
    fn test_pair_rejects_same_name() {
        let a = sensor("avhrr.n11", "1988-11-08", "1994-12-31");
        assert!(SensorPair::new(a.clone(), a).is_none());
    }

    #[test]
    fn test_pair_rejects_touching_periods() {
        let n10 = sensor("avhrr.n10", "1986-11-17", "1991-09-16");
        let n12 = sensor("avhrr.n12", "1991-09-16", "1998-12-14");
        assert!(SensorPair::new(n12, n10).is_none());
    }

    #[test]
    fn test_pair_rejects_disjoint_periods() {
        let a = sensor("atsr-e1", "1991-06-01", "1995-01-01");
        let b = sensor("atsr-en", "1996-01-01", "1998-01-01");
        assert!(SensorPair::new(a, b).is_none());
    }

    #[test]
    fn test_same_families_ignores_roles() {
        let n11 = sensor("avhrr.n11", "1988-11-08", "1994-12-31");
        let n12 = sensor("avhrr.n12", "1991-09-16", "1998-12-14");
        let forward = SensorPair::new(n12.clone(), n11.clone()).unwrap();
        let backward = SensorPair::new(n11, n12).unwrap();
        assert!(forward.same_families(&backward));
        assert_ne!(forward, backward);
    }
}
