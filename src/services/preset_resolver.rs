//! Preset resolution.
//!
//! Presets name ordered phase subsets. They merge in three layers, later
//! layers overriding earlier: built-in defaults, the on-disk
//! `test/presets.json`, then `testing.json` presets. Every layer
//! normalizes names, discards blanks, deduplicates (first occurrence
//! wins), and filters against the available phase set; a preset left
//! empty by filtering is removed entirely.

use std::collections::{HashMap, HashSet};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    normalize_phase_name, ScenarioConfig, ScenarioWorkspace,
};

/// Preset overrides file under the test directory.
pub const PRESETS_FILE: &str = "presets.json";

fn builtin_presets() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("quick", vec!["structure", "unit"]),
        ("smoke", vec!["structure", "integration"]),
        (
            "comprehensive",
            vec![
                "structure",
                "dependencies",
                "unit",
                "integration",
                "business",
                "performance",
            ],
        ),
    ]
}

fn apply_layer(
    presets: &mut HashMap<String, Vec<String>>,
    name: &str,
    phases: impl IntoIterator<Item = String>,
    available: &HashSet<String>,
) {
    let preset_name = normalize_phase_name(name);
    if preset_name.is_empty() {
        return;
    }
    let mut seen = HashSet::new();
    let filtered: Vec<String> = phases
        .into_iter()
        .map(|p| normalize_phase_name(&p))
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .filter(|p| available.contains(p))
        .collect();
    if filtered.is_empty() {
        // An override that filters to nothing removes the preset.
        presets.remove(&preset_name);
    } else {
        presets.insert(preset_name, filtered);
    }
}

fn load_disk_presets(workspace: &ScenarioWorkspace) -> DomainResult<HashMap<String, Vec<String>>> {
    let path = workspace.test_dir.join(PRESETS_FILE);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| DomainError::system(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| {
        DomainError::validation(format!("{} is not valid JSON: {e}", path.display()))
    })
}

/// Resolve the full preset map for a scenario against the available
/// phase names.
pub fn resolve_presets(
    workspace: &ScenarioWorkspace,
    config: &ScenarioConfig,
    available_phases: &[String],
) -> DomainResult<HashMap<String, Vec<String>>> {
    let available: HashSet<String> = available_phases
        .iter()
        .map(|p| normalize_phase_name(p))
        .collect();

    let mut presets = HashMap::new();
    for (name, phases) in builtin_presets() {
        apply_layer(
            &mut presets,
            name,
            phases.into_iter().map(str::to_string),
            &available,
        );
    }
    for (name, phases) in load_disk_presets(workspace)? {
        apply_layer(&mut presets, &name, phases, &available);
    }
    for (name, phases) in &config.presets {
        apply_layer(&mut presets, name, phases.clone(), &available);
    }
    Ok(presets)
}
