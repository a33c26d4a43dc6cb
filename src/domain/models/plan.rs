//! Execution requests and phase plans.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::phase::PhaseDefinition;

/// Input to the orchestrator and the execution service.
///
/// When both `preset` and `phases` are empty, all enabled definitions run
/// in catalog order. Name lists are case-insensitive; blanks are discarded;
/// unknown names are rejected during plan building.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteExecutionRequest {
    pub scenario_name: String,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default)]
    pub skip: Vec<String>,
    #[serde(default)]
    pub fail_fast: bool,
    /// Link to a queued suite request, consumed by the execution service.
    #[serde(default)]
    pub suite_request_id: Option<Uuid>,
}

impl SuiteExecutionRequest {
    pub fn for_scenario(scenario_name: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            ..Self::default()
        }
    }

    /// The preset name, treating blank strings as absent.
    pub fn preset_name(&self) -> Option<&str> {
        self.preset
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Explicit phase names with blanks discarded.
    pub fn explicit_phases(&self) -> Vec<&str> {
        self.phases
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Skip names with blanks discarded.
    pub fn skip_phases(&self) -> Vec<&str> {
        self.skip
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// The concrete ordered selection for one run.
#[derive(Debug, Clone)]
pub struct PhasePlan {
    /// Every enabled definition discovered for the scenario, in catalog
    /// order. Used to decide requirements-sync eligibility.
    pub definitions: Vec<PhaseDefinition>,
    /// The ordered subset selected for execution.
    pub selected: Vec<PhaseDefinition>,
    /// Name of the preset that produced the selection; empty when the
    /// selection came from explicit phases or defaulted to everything.
    pub preset_used: String,
}

impl PhasePlan {
    pub fn selected_names(&self) -> Vec<&str> {
        self.selected.iter().map(|d| d.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_preset_treated_as_absent() {
        let mut request = SuiteExecutionRequest::for_scenario("demo");
        assert_eq!(request.preset_name(), None);

        request.preset = Some("   ".to_string());
        assert_eq!(request.preset_name(), None);

        request.preset = Some(" quick ".to_string());
        assert_eq!(request.preset_name(), Some("quick"));
    }

    #[test]
    fn test_blank_entries_discarded() {
        let request = SuiteExecutionRequest {
            scenario_name: "demo".to_string(),
            phases: vec!["unit".into(), "  ".into(), String::new()],
            skip: vec![String::new(), "business ".into()],
            ..SuiteExecutionRequest::default()
        };
        assert_eq!(request.explicit_phases(), vec!["unit"]);
        assert_eq!(request.skip_phases(), vec!["business"]);
    }
}
