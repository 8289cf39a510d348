//! Sensor registry.

use super::types::{Sensor, SensorRole};

/// Holds the primary and secondary sensor declarations of a run.
///
/// Sensors are stored in declaration order and sorted on read; callers always
/// see the most recent sensor first.
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    primary: Vec<Sensor>,
    secondary: Vec<Sensor>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a sensor in the given role. Identical declarations are kept once.
    pub fn add(&mut self, role: SensorRole, sensor: Sensor) {
        let sensors = match role {
            SensorRole::Primary => &mut self.primary,
            SensorRole::Secondary => &mut self.secondary,
        };
        if !sensors.contains(&sensor) {
            sensors.push(sensor);
        }
    }

    pub fn add_primary(&mut self, sensor: Sensor) {
        self.add(SensorRole::Primary, sensor);
    }

    pub fn add_secondary(&mut self, sensor: Sensor) {
        self.add(SensorRole::Secondary, sensor);
    }

    /// Primary sensors, latest period start first.
    pub fn primary_sensors(&self) -> Vec<Sensor> {
        sorted(&self.primary)
    }

    /// Secondary sensors, latest period start first.
    pub fn secondary_sensors(&self) -> Vec<Sensor> {
        sorted(&self.secondary)
    }

    pub fn sensors(&self, role: SensorRole) -> Vec<Sensor> {
        match role {
            SensorRole::Primary => self.primary_sensors(),
            SensorRole::Secondary => self.secondary_sensors(),
        }
    }

    /// Total number of declarations across both roles.
    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }

    /// The one declared sensor, if exactly one exists across both roles.
    pub fn single_sensor(&self) -> Option<&Sensor> {
        match (self.primary.as_slice(), self.secondary.as_slice()) {
            ([only], []) | ([], [only]) => Some(only),
            _ => None,
        }
    }
}

fn sorted(sensors: &[Sensor]) -> Vec<Sensor> {
    let mut sensors = sensors.to_vec();
    sensors.sort_by(|a, b| a.cmp_recent_first(b));
    sensors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Period;

    fn sensor(name: &str, start: &str, end: &str) -> Sensor {
        Sensor::new(name, Period::parse(start, end).unwrap())
    }

    #[test]
    fn test_empty_registry() {
        let registry = SensorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.primary_sensors().is_empty());
        assert!(registry.secondary_sensors().is_empty());
        assert!(registry.single_sensor().is_none());
    }

    #[test]
    fn test_primary_sensors_sorted_most_recent_first() {
        let mut registry = SensorRegistry::new();
        registry.add_primary(sensor("atsr-e2", "1995-06-01", "1996-01-01"));
        registry.add_primary(sensor("atsr-e1", "1991-06-01", "1995-01-01"));
        registry.add_primary(sensor("atsr-en", "1996-01-01", "1998-01-01"));

        assert_eq!(
            registry.primary_sensors(),
            vec![
                sensor("atsr-en", "1996-01-01", "1998-01-01"),
                sensor("atsr-e2", "1995-06-01", "1996-01-01"),
                sensor("atsr-e1", "1991-06-01", "1995-01-01"),
            ]
        );
    }

    #[test]
    fn test_secondary_sensors_sorted_most_recent_first() {
        let mut registry = SensorRegistry::new();
        registry.add_secondary(sensor("atsr-e2", "1996-06-01", "1997-01-01"));
        registry.add_secondary(sensor("atsr-e1", "1992-06-01", "1996-01-01"));
        registry.add_secondary(sensor("atsr-en", "1997-01-01", "1999-01-01"));

        let names: Vec<_> = registry
            .secondary_sensors()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["atsr-en", "atsr-e2", "atsr-e1"]);
        assert!(registry.primary_sensors().is_empty());
    }

    #[test]
    fn test_duplicate_declaration_kept_once() {
        let mut registry = SensorRegistry::new();
        registry.add_primary(sensor("avhrr-n12", "1995-06-01", "1996-06-05"));
        registry.add_primary(sensor("avhrr-n12", "1995-06-01", "1996-06-05"));
        assert_eq!(registry.len(), 1);
        assert!(registry.single_sensor().is_some());
    }

    #[test]
    fn test_single_sensor_in_secondary_role() {
        let mut registry = SensorRegistry::new();
        registry.add_secondary(sensor("avhrr-n16", "1995-06-01", "1996-01-01"));
        assert_eq!(registry.single_sensor().map(|s| s.name()), Some("avhrr-n16"));

        registry.add_primary(sensor("avhrr-n15", "1995-06-01", "1996-01-01"));
        assert!(registry.single_sensor().is_none());
    }
}
