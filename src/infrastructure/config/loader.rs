//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::GenieConfig;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid default_phase_timeout_secs: {0}. Must be at least 1")]
    InvalidPhaseTimeout(u64),

    #[error("Invalid max_execution_history: {0}. Must be at least 1")]
    InvalidMaxHistory(i64),

    #[error("Invalid queue latency: {0}. Must not be negative")]
    InvalidQueueLatency(i64),
}

/// Loads `GenieConfig` with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, lowest precedence first:
    /// 1. Programmatic defaults
    /// 2. `.genie/config.yaml` (project config)
    /// 3. `.genie/local.yaml` (optional local overrides)
    /// 4. `GENIE_*` environment variables
    ///
    /// Configuration is always project-local so one machine can host
    /// several projects with independent settings.
    pub fn load() -> Result<GenieConfig> {
        let config: GenieConfig = Figment::new()
            .merge(Serialized::defaults(GenieConfig::default()))
            .merge(Yaml::file(".genie/config.yaml"))
            .merge(Yaml::file(".genie/local.yaml"))
            .merge(Env::prefixed("GENIE_").split("__"))
            .extract()
            .context("failed to extract configuration")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file over the defaults.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<GenieConfig> {
        let config: GenieConfig = Figment::new()
            .merge(Serialized::defaults(GenieConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &GenieConfig) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.execution.default_phase_timeout_secs == 0 {
            return Err(ConfigError::InvalidPhaseTimeout(
                config.execution.default_phase_timeout_secs,
            ));
        }
        if config.execution.max_execution_history < 1 {
            return Err(ConfigError::InvalidMaxHistory(
                config.execution.max_execution_history,
            ));
        }
        if config.execution.queue_base_latency_secs < 0 {
            return Err(ConfigError::InvalidQueueLatency(
                config.execution.queue_base_latency_secs,
            ));
        }
        if config.execution.queue_per_item_latency_secs < 0 {
            return Err(ConfigError::InvalidQueueLatency(
                config.execution.queue_per_item_latency_secs,
            ));
        }

        Ok(())
    }
}
