//! Per-scenario configuration (`testing.json`).
//!
//! The file is optional; when absent an empty config applies. Unknown keys
//! are ignored so scenarios can carry tool-specific extensions.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::phase::normalize_phase_name;

/// Config file name under the scenario directory.
pub const SCENARIO_CONFIG_FILE: &str = "testing.json";

/// Per-phase override block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhaseOverride {
    /// When false, the phase is dropped from the plan.
    pub enabled: Option<bool>,
    /// Duration string overriding the phase's default timeout.
    pub timeout: Option<String>,
}

/// Parsed `testing.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub phases: HashMap<String, PhaseOverride>,
    #[serde(default)]
    pub presets: HashMap<String, Vec<String>>,
    /// Host commands the dependencies phase should probe for, on top of
    /// the built-in ones.
    #[serde(default)]
    pub required_commands: Vec<String>,
}

impl ScenarioConfig {
    /// Load `testing.json` from the scenario directory. A missing file
    /// yields the empty config; an unreadable or malformed file is an
    /// error.
    pub fn load(scenario_dir: &Path) -> DomainResult<Self> {
        let path = scenario_dir.join(SCENARIO_CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            DomainError::system(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DomainError::validation(format!("{} is not valid JSON: {e}", path.display()))
        })
    }

    fn override_for(&self, phase: &str) -> Option<&PhaseOverride> {
        let normalized = normalize_phase_name(phase);
        self.phases
            .iter()
            .find(|(name, _)| normalize_phase_name(name) == normalized)
            .map(|(_, o)| o)
    }

    /// Whether the phase is enabled (default true).
    pub fn phase_enabled(&self, phase: &str) -> bool {
        self.override_for(phase)
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }

    /// Timeout override for the phase, if one is configured and positive.
    /// A zero duration falls back to the default, so it reads as None.
    pub fn phase_timeout(&self, phase: &str) -> DomainResult<Option<Duration>> {
        let Some(raw) = self.override_for(phase).and_then(|o| o.timeout.as_deref()) else {
            return Ok(None);
        };
        let parsed = parse_duration(raw)?;
        if parsed.is_zero() {
            return Ok(None);
        }
        Ok(Some(parsed))
    }
}

/// Parse a human-readable duration: an integer with an optional `s`, `m`,
/// or `h` suffix. A bare integer means seconds.
pub fn parse_duration(raw: &str) -> DomainResult<Duration> {
    let trimmed = raw.trim();
    let invalid = || {
        DomainError::validation(format!(
            "invalid duration '{raw}': expected an integer with optional s/m/h suffix"
        ))
    };
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let (digits, multiplier) = match trimmed.chars().last() {
        Some('s') => (&trimmed[..trimmed.len() - 1], 1),
        Some('m') => (&trimmed[..trimmed.len() - 1], 60),
        Some('h') => (&trimmed[..trimmed.len() - 1], 3600),
        Some(c) if c.is_ascii_digit() => (trimmed, 1),
        _ => return Err(invalid()),
    };
    let value: u64 = digits.parse().map_err(|_| invalid())?;
    Ok(Duration::from_secs(value * multiplier))
}
