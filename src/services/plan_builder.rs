//! Phase plan building: discovery, config application, and selection.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    normalize_phase_name, PhaseDefinition, PhasePlan, PhaseSource, ScenarioConfig,
    ScenarioWorkspace, SuiteExecutionRequest,
};
use crate::services::catalog::PhaseCatalog;
use crate::services::preset_resolver::resolve_presets;
use crate::services::runners::ScriptRunner;

/// Weight offset for script-discovered phases so they sort after the
/// catalog's built-ins.
const SCRIPT_WEIGHT_BASE: u32 = 100;

/// Builds the ordered phase plan for one run.
pub struct PlanBuilder<'a> {
    catalog: &'a PhaseCatalog,
    default_timeout: Duration,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(catalog: &'a PhaseCatalog, default_timeout: Duration) -> Self {
        let default_timeout = if default_timeout.is_zero() {
            catalog.default_timeout()
        } else {
            default_timeout
        };
        Self {
            catalog,
            default_timeout,
        }
    }

    /// Enumerate catalog definitions plus script-backed phases discovered
    /// under the phases directory. A script only contributes a definition
    /// when its phase name is not already in the catalog.
    pub fn discover(&self, workspace: &ScenarioWorkspace) -> DomainResult<Vec<PhaseDefinition>> {
        let mut definitions = self.catalog.all();

        let mut scripts: Vec<(String, std::path::PathBuf)> = Vec::new();
        let entries = std::fs::read_dir(&workspace.phases_dir).map_err(|e| {
            DomainError::system(format!(
                "failed to scan {}: {e}",
                workspace.phases_dir.display()
            ))
        })?;
        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(stem) = file_name
                .strip_prefix("test-")
                .and_then(|s| s.strip_suffix(".sh"))
            else {
                continue;
            };
            let name = normalize_phase_name(stem);
            if name.is_empty() || self.catalog.contains(&name) {
                continue;
            }
            if !entry.path().is_file() {
                continue;
            }
            scripts.push((name, entry.path()));
        }
        // Filename order keeps script weights deterministic across runs.
        scripts.sort_by(|a, b| a.0.cmp(&b.0));

        for (index, (name, path)) in scripts.into_iter().enumerate() {
            let weight = SCRIPT_WEIGHT_BASE + u32::try_from(index).unwrap_or(0) * 10;
            let description = format!("Runs test-{name}.sh");
            definitions.push(PhaseDefinition {
                runner: Arc::new(ScriptRunner::new(path)),
                name,
                timeout: self.default_timeout,
                weight,
                optional: false,
                description,
                source: PhaseSource::Script,
            });
        }

        definitions.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.name.cmp(&b.name)));
        Ok(definitions)
    }

    /// Drop disabled phases and apply timeout overrides.
    pub fn apply_config(
        &self,
        definitions: Vec<PhaseDefinition>,
        config: &ScenarioConfig,
    ) -> DomainResult<Vec<PhaseDefinition>> {
        let mut enabled = Vec::with_capacity(definitions.len());
        for mut definition in definitions {
            if !config.phase_enabled(&definition.name) {
                continue;
            }
            if let Some(timeout) = config.phase_timeout(&definition.name)? {
                definition.timeout = timeout;
            }
            enabled.push(definition);
        }
        if enabled.is_empty() {
            return Err(DomainError::validation(
                "scenario has no enabled phase definitions",
            ));
        }
        Ok(enabled)
    }

    /// Produce the ordered selection from the request, presets, and skips.
    pub fn build(
        &self,
        workspace: &ScenarioWorkspace,
        config: &ScenarioConfig,
        request: &SuiteExecutionRequest,
    ) -> DomainResult<PhasePlan> {
        let definitions = self.apply_config(self.discover(workspace)?, config)?;
        let available: HashSet<&str> = definitions.iter().map(|d| d.name.as_str()).collect();

        let explicit = request.explicit_phases();
        let mut preset_used = String::new();
        let desired: Vec<String> = if !explicit.is_empty() {
            explicit.iter().map(|p| normalize_phase_name(p)).collect()
        } else if let Some(preset) = request.preset_name() {
            let names: Vec<String> = definitions.iter().map(|d| d.name.clone()).collect();
            let presets = resolve_presets(workspace, config, &names)?;
            let key = normalize_phase_name(preset);
            let Some(phases) = presets.get(&key) else {
                return Err(DomainError::validation(format!(
                    "preset '{preset}' is not defined"
                )));
            };
            preset_used = key;
            phases.clone()
        } else {
            definitions.iter().map(|d| d.name.clone()).collect()
        };

        for name in &desired {
            if !available.contains(name.as_str()) {
                return Err(DomainError::validation(format!(
                    "phase '{name}' is not defined"
                )));
            }
        }

        let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();
        let skip_set: HashSet<String> = request
            .skip_phases()
            .iter()
            .map(|p| normalize_phase_name(p))
            .collect();

        // Selection never reorders: it subsets the weight-ordered list.
        let selected: Vec<PhaseDefinition> = definitions
            .iter()
            .filter(|d| desired_set.contains(d.name.as_str()))
            .filter(|d| !skip_set.contains(&d.name))
            .cloned()
            .collect();

        if selected.is_empty() {
            return Err(DomainError::validation("no phases selected for execution"));
        }

        Ok(PhasePlan {
            definitions,
            selected,
            preset_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{default_catalog, DEFAULT_PHASE_TIMEOUT};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn workspace(root: &Path) -> ScenarioWorkspace {
        fs::create_dir_all(root.join("demo/test/phases")).unwrap();
        ScenarioWorkspace::resolve(root, "demo").unwrap()
    }

    fn write_script(ws: &ScenarioWorkspace, name: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = ws.phases_dir.join(name);
        fs::write(&path, "#!/bin/bash\nexit 0\n").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
    }

    fn selected_names(plan: &PhasePlan) -> Vec<&str> {
        plan.selected.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_default_selection_runs_everything_in_order() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let request = SuiteExecutionRequest::for_scenario("demo");
        let plan = builder.build(&ws, &ScenarioConfig::default(), &request).unwrap();

        assert_eq!(
            selected_names(&plan),
            vec!["structure", "dependencies", "unit", "integration", "business", "performance"]
        );
        assert_eq!(plan.preset_used, "");
        assert_eq!(plan.definitions.len(), plan.selected.len());
    }

    #[test]
    fn test_script_discovery_appends_unknown_phases() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        write_script(&ws, "test-lint.sh");
        write_script(&ws, "test-unit.sh"); // shadowed by the catalog
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let definitions = builder.discover(&ws).unwrap();
        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["structure", "dependencies", "unit", "integration", "business", "performance", "lint"]
        );
        let lint = definitions.iter().find(|d| d.name == "lint").unwrap();
        assert_eq!(lint.source, PhaseSource::Script);
        assert_eq!(lint.timeout, DEFAULT_PHASE_TIMEOUT);
        // Only one unit phase, the native one.
        assert_eq!(names.iter().filter(|n| **n == "unit").count(), 1);
    }

    #[test]
    fn test_disabled_phase_dropped_and_timeout_overridden() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        fs::write(
            ws.scenario_dir.join("testing.json"),
            r#"{"phases": {"performance": {"enabled": false}, "unit": {"timeout": "90s"}}}"#,
        )
        .unwrap();
        let config = ScenarioConfig::load(&ws.scenario_dir).unwrap();
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let request = SuiteExecutionRequest::for_scenario("demo");
        let plan = builder.build(&ws, &config, &request).unwrap();

        assert!(!selected_names(&plan).contains(&"performance"));
        let unit = plan.selected.iter().find(|d| d.name == "unit").unwrap();
        assert_eq!(unit.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_all_phases_disabled_is_validation_error() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let mut config = ScenarioConfig::default();
        for phase in ["structure", "dependencies", "unit", "integration", "business", "performance"]
        {
            config.phases.insert(
                phase.to_string(),
                crate::domain::models::PhaseOverride {
                    enabled: Some(false),
                    timeout: None,
                },
            );
        }
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let request = SuiteExecutionRequest::for_scenario("demo");
        let err = builder.build(&ws, &config, &request).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("no enabled phase definitions"));
    }

    #[test]
    fn test_preset_selection() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let mut request = SuiteExecutionRequest::for_scenario("demo");
        request.preset = Some("Quick".to_string());
        let plan = builder.build(&ws, &ScenarioConfig::default(), &request).unwrap();

        assert_eq!(selected_names(&plan), vec!["structure", "unit"]);
        assert_eq!(plan.preset_used, "quick");
        assert_eq!(plan.definitions.len(), 6);
    }

    #[test]
    fn test_unknown_preset_is_validation_error() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let mut request = SuiteExecutionRequest::for_scenario("demo");
        request.preset = Some("nightly".to_string());
        let err = builder.build(&ws, &ScenarioConfig::default(), &request).unwrap_err();
        assert!(err.to_string().contains("preset 'nightly' is not defined"));
    }

    #[test]
    fn test_unknown_explicit_phase_is_validation_error() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let mut request = SuiteExecutionRequest::for_scenario("demo");
        request.phases = vec!["ghost".to_string()];
        let err = builder.build(&ws, &ScenarioConfig::default(), &request).unwrap_err();
        assert!(err.to_string().contains("phase 'ghost' is not defined"));
    }

    #[test]
    fn test_explicit_phases_subset_in_catalog_order() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let mut request = SuiteExecutionRequest::for_scenario("demo");
        request.phases = vec!["Integration".to_string(), "structure".to_string()];
        let plan = builder.build(&ws, &ScenarioConfig::default(), &request).unwrap();

        // Never reorders: catalog order wins over request order.
        assert_eq!(selected_names(&plan), vec!["structure", "integration"]);
        assert_eq!(plan.preset_used, "");
    }

    #[test]
    fn test_skips_subtract_from_selection() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let mut request = SuiteExecutionRequest::for_scenario("demo");
        request.skip = vec!["Performance".to_string(), "business".to_string()];
        let plan = builder.build(&ws, &ScenarioConfig::default(), &request).unwrap();

        assert_eq!(
            selected_names(&plan),
            vec!["structure", "dependencies", "unit", "integration"]
        );
    }

    #[test]
    fn test_skipping_everything_is_validation_error() {
        let root = tempdir().unwrap();
        let ws = workspace(root.path());
        let catalog = default_catalog(DEFAULT_PHASE_TIMEOUT);
        let builder = PlanBuilder::new(&catalog, DEFAULT_PHASE_TIMEOUT);

        let mut request = SuiteExecutionRequest::for_scenario("demo");
        request.phases = vec!["unit".to_string()];
        request.skip = vec!["unit".to_string()];
        let err = builder.build(&ws, &ScenarioConfig::default(), &request).unwrap_err();
        assert!(err.to_string().contains("no phases selected"));
    }
}
