//! Configuration Loader
//!
//! Reads the benchmark configuration from a YAML file and checks it
//! before any database is touched.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::ConfigError;

use super::model::BenchConfig;

/// Loads and validates a configuration file.
///
/// # Example
///
/// ```rust,no_run
/// use sqlbench::config::load_config;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_config("sqlbench.yaml")?;
///     println!("Loaded {} targets", config.targets.len());
///     Ok(())
/// }
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BenchConfig, ConfigError> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Config content loaded ({} bytes)", content.len());

    parse_config(&content)
}

/// Parses and validates configuration YAML.
pub fn parse_config(content: &str) -> Result<BenchConfig, ConfigError> {
    let config: BenchConfig = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks the structural rules serde cannot express.
pub fn validate_config(config: &BenchConfig) -> Result<(), ConfigError> {
    if config.targets.is_empty() {
        return Err(ConfigError::Invalid("no targets defined".to_string()));
    }

    if config.monitor.lookup_attempts == 0 {
        return Err(ConfigError::Invalid(
            "monitor.lookup_attempts must be at least 1".to_string(),
        ));
    }

    if config.monitor.sample_interval_ms == 0 {
        return Err(ConfigError::Invalid(
            "monitor.sample_interval_ms must be greater than 0".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for target in &config.targets {
        if target.name.trim().is_empty() {
            return Err(ConfigError::Invalid("target name cannot be empty".to_string()));
        }
        if !names.insert(target.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate target name: '{}'",
                target.name
            )));
        }
        if target.script.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "target '{}' has no script",
                target.name
            )));
        }
        if target.process_name().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "target '{}' has an empty process name",
                target.name
            )));
        }
    }

    Ok(())
}
