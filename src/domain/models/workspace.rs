//! Scenario workspace resolution.
//!
//! A scenario is a named directory under the scenarios root holding a test
//! harness (`test/`, `test/phases/`). The workspace is derived, never
//! persisted; all paths are absolute after resolution.

use std::path::{Path, PathBuf};

use crate::domain::errors::{DomainError, DomainResult};

/// Directory under `test/` where per-phase logs are written.
pub const ARTIFACT_DIR_NAME: &str = "artifacts";

/// Resolved paths for one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioWorkspace {
    pub scenario_name: String,
    pub scenario_dir: PathBuf,
    pub test_dir: PathBuf,
    pub phases_dir: PathBuf,
    /// Parent of the scenarios root.
    pub app_root: PathBuf,
}

/// Scenario names are restricted to filesystem-safe characters.
pub fn valid_scenario_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl ScenarioWorkspace {
    /// Resolve a scenario by name under the scenarios root.
    ///
    /// Fails with `validation` when the name is invalid or the scenario
    /// directory is missing, and with `system` when the test harness
    /// directories are absent.
    pub fn resolve(scenarios_root: &Path, scenario_name: &str) -> DomainResult<Self> {
        let name = scenario_name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("scenario name cannot be empty"));
        }
        if !valid_scenario_name(name) {
            return Err(DomainError::validation(format!(
                "scenario name '{name}' may only contain letters, digits, '_' and '-'"
            )));
        }

        let scenario_dir = scenarios_root.join(name);
        if !scenario_dir.is_dir() {
            return Err(DomainError::validation(format!(
                "scenario '{name}' does not exist under {}",
                scenarios_root.display()
            )));
        }
        let scenario_dir = scenario_dir.canonicalize().map_err(|e| {
            DomainError::system(format!(
                "failed to resolve scenario directory {}: {e}",
                scenario_dir.display()
            ))
        })?;

        let test_dir = scenario_dir.join("test");
        if !test_dir.is_dir() {
            return Err(DomainError::system(format!(
                "scenario '{name}' has no test directory at {}",
                test_dir.display()
            )));
        }
        let phases_dir = test_dir.join("phases");
        if !phases_dir.is_dir() {
            return Err(DomainError::system(format!(
                "scenario '{name}' has no phases directory at {}",
                phases_dir.display()
            )));
        }

        let app_root = scenario_dir
            .parent()
            .and_then(Path::parent)
            .unwrap_or(&scenario_dir)
            .to_path_buf();

        Ok(Self {
            scenario_name: name.to_string(),
            scenario_dir,
            test_dir,
            phases_dir,
            app_root,
        })
    }

    /// Where phase logs for this scenario land.
    pub fn artifact_dir(&self) -> PathBuf {
        self.test_dir.join(ARTIFACT_DIR_NAME)
    }

    /// Create the artifact directory if needed and return its path.
    /// Idempotent.
    pub fn ensure_artifact_dir(&self) -> DomainResult<PathBuf> {
        let dir = self.artifact_dir();
        std::fs::create_dir_all(&dir).map_err(|e| {
            DomainError::system(format!(
                "failed to create artifact directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(dir)
    }
}
