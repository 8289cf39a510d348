use std::collections::HashSet;

use super::{types::SensorConfig, types::WorkflowConfig, ConfigError};
use crate::hosts::MAX_POOL_CORES;

/// Validate configuration
/// Currently validates:
/// - Usecase name is not empty
/// - Slot length, samples and attempt budget are not 0
/// - Every host declares at least one core, and the pool stays within
///   the supported core count
/// - Dates parse and periods are not inverted
/// - Sensor names are unique within a role
pub fn validate_config(config: &WorkflowConfig) -> Result<(), ConfigError> {
    if config.usecase.trim().is_empty() {
        return Err(invalid("usecase cannot be empty"));
    }
    if config.time_slot_days == 0 {
        return Err(invalid("time_slot_days cannot be 0"));
    }
    if config.samples_per_time_slot == 0 {
        return Err(invalid("samples_per_time_slot cannot be 0"));
    }
    if config.retry.max_attempts == 0 {
        return Err(invalid("retry.max_attempts cannot be 0"));
    }

    let mut total_cores: usize = 0;
    for host in &config.hosts {
        if host.cores == 0 {
            return Err(invalid(format!("host '{}' declares 0 cores", host.name)));
        }
        total_cores = total_cores.saturating_add(host.cores);
    }
    if total_cores > MAX_POOL_CORES {
        return Err(invalid(format!(
            "hosts declare {} cores, at most {} are supported",
            total_cores, MAX_POOL_CORES
        )));
    }

    if let Some(period) = &config.production_period {
        period
            .to_period()
            .map_err(|e| invalid(format!("production_period: {}", e)))?;
    }

    validate_sensors("primary_sensors", &config.primary_sensors)?;
    validate_sensors("secondary_sensors", &config.secondary_sensors)?;

    Ok(())
}

fn validate_sensors(role: &str, sensors: &[SensorConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for sensor in sensors {
        if !seen.insert(sensor.name.as_str()) {
            return Err(invalid(format!(
                "{}: sensor '{}' declared twice",
                role, sensor.name
            )));
        }
        sensor
            .to_sensor()
            .map_err(|e| invalid(format!("{}: sensor '{}': {}", role, sensor.name, e)))?;
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use crate::hosts::HostEntry;

    fn valid_config() -> WorkflowConfig {
        load_config_from_str(
            r#"
usecase = "usecase-02"

[[primary_sensors]]
name = "atsr-e2"
start = "1995-06-01"
end = "2008-01-01"

[[hosts]]
name = "localhost"
cores = 2
"#,
        )
        .unwrap()
    }

    fn assert_invalid(config: &WorkflowConfig, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(message)) => {
                assert!(message.contains(needle), "unexpected message: {}", message)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_usecase() {
        let mut config = valid_config();
        config.usecase = "  ".to_string();
        assert_invalid(&config, "usecase");
    }

    #[test]
    fn test_validate_zero_values() {
        let mut config = valid_config();
        config.time_slot_days = 0;
        assert_invalid(&config, "time_slot_days");

        let mut config = valid_config();
        config.samples_per_time_slot = 0;
        assert_invalid(&config, "samples_per_time_slot");

        let mut config = valid_config();
        config.retry.max_attempts = 0;
        assert_invalid(&config, "max_attempts");

        let mut config = valid_config();
        config.hosts.push(HostEntry::new("broken", 0));
        assert_invalid(&config, "broken");
    }

    #[test]
    fn test_validate_oversized_host() {
        let config = load_config_from_str(
            r#"
usecase = "usecase-02"

[[hosts]]
name = "bignode"
cores = 9000000000000000000
"#,
        )
        .unwrap();
        assert_invalid(&config, "cores");

        let mut config = valid_config();
        config.hosts.push(HostEntry::new("node-a", MAX_POOL_CORES));
        assert_invalid(&config, "at most");
    }

    #[test]
    fn test_validate_inverted_sensor_period() {
        let mut config = valid_config();
        config.primary_sensors[0].end = "1990-01-01".to_string();
        assert_invalid(&config, "atsr-e2");
    }

    #[test]
    fn test_validate_duplicate_sensor() {
        let mut config = valid_config();
        let duplicate = config.primary_sensors[0].clone();
        config.primary_sensors.push(duplicate.clone());
        assert_invalid(&config, "declared twice");

        // The same sensor may appear once in each role.
        let mut config = valid_config();
        config.secondary_sensors.push(duplicate);
        assert!(validate_config(&config).is_ok());
    }
}
