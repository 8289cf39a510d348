use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::WorkflowConfig, ConfigError};

/// Prefix of environment variables overriding file settings.
///
/// Nested keys use a double underscore: `SENSORPLAN_RUN__LOG_DIR`.
pub const ENV_PREFIX: &str = "SENSORPLAN_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<WorkflowConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: WorkflowConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<WorkflowConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
