//! Configuration loading
//!
//! Reads a [`SimulationConfig`] from JSON. Missing fields take their
//! defaults; the result is validated before it is returned.

use crate::application::SimulationConfig;
use crate::error::ConfigError;
use log::info;
use std::path::Path;

/// Load configuration from a JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<SimulationConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let config = config_from_json(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse configuration from a JSON string
pub fn config_from_json(json: &str) -> Result<SimulationConfig, ConfigError> {
    let config: SimulationConfig =
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
