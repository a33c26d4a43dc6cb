//! Process-level configuration model.
//!
//! Loaded by `infrastructure::config::ConfigLoader` with hierarchical
//! merging (defaults, `.genie/config.yaml`, `GENIE_*` env).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenieConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite:.genie/genie.db`.
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "sqlite:.genie/genie.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error.
    pub level: String,
    /// One of: json, pretty.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Orchestrator execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Global default per-phase timeout, used when neither the catalog
    /// entry nor the scenario config supplies one.
    pub default_phase_timeout_secs: u64,
    /// Upper bound for history listing limits.
    pub max_execution_history: i64,
    /// Floor of the estimated queue wait.
    pub queue_base_latency_secs: i64,
    /// Per queued item added to the estimated wait.
    pub queue_per_item_latency_secs: i64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_phase_timeout_secs: 300,
            max_execution_history: 50,
            queue_base_latency_secs: 30,
            queue_per_item_latency_secs: 15,
        }
    }
}

impl ExecutionConfig {
    pub fn default_phase_timeout(&self) -> Duration {
        Duration::from_secs(self.default_phase_timeout_secs)
    }
}
