//! Suite execution results and their persisted form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::phase::{summarize_phases, PhaseResult, PhaseSummary};

/// Full outcome of one orchestrator run.
///
/// Invariants: `started_at <= completed_at`; `success` iff no phase failed.
/// The execution id is assigned by persistence, not by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteExecutionResult {
    pub execution_id: Option<Uuid>,
    pub suite_request_id: Option<Uuid>,
    pub scenario_name: String,
    /// Empty when the run was not driven by a preset.
    pub preset_used: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub success: bool,
    pub phases: Vec<PhaseResult>,
    pub summary: PhaseSummary,
}

/// The persisted form of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteExecutionRecord {
    pub id: Uuid,
    pub suite_request_id: Option<Uuid>,
    pub scenario_name: String,
    pub preset_used: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub success: bool,
    pub phases: Vec<PhaseResult>,
}

impl SuiteExecutionRecord {
    pub fn from_result(
        id: Uuid,
        suite_request_id: Option<Uuid>,
        result: &SuiteExecutionResult,
    ) -> Self {
        Self {
            id,
            suite_request_id,
            scenario_name: result.scenario_name.clone(),
            preset_used: result.preset_used.clone(),
            started_at: result.started_at,
            completed_at: result.completed_at,
            success: result.success,
            phases: result.phases.clone(),
        }
    }

    /// Rebuild the result view, recomputing the summary from the stored
    /// phase list so persisted counts can never drift.
    pub fn into_result(self) -> SuiteExecutionResult {
        let summary = summarize_phases(&self.phases);
        SuiteExecutionResult {
            execution_id: Some(self.id),
            suite_request_id: self.suite_request_id,
            scenario_name: self.scenario_name,
            preset_used: self.preset_used,
            started_at: self.started_at,
            completed_at: self.completed_at,
            success: self.success,
            phases: self.phases,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::phase::PhaseStatus;

    #[test]
    fn test_record_round_trip_recomputes_summary() {
        let result = SuiteExecutionResult {
            execution_id: None,
            suite_request_id: None,
            scenario_name: "demo".to_string(),
            preset_used: String::new(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
            success: false,
            phases: vec![PhaseResult {
                phase: "unit".to_string(),
                status: PhaseStatus::Failed,
                duration_seconds: 3,
                log_path: "artifacts/unit.log".to_string(),
                error: "boom".to_string(),
                classification: None,
                remediation: String::new(),
                observations: vec!["ran tests".to_string()],
            }],
            summary: PhaseSummary::default(),
        };

        let id = Uuid::new_v4();
        let record = SuiteExecutionRecord::from_result(id, None, &result);
        let rebuilt = record.into_result();

        assert_eq!(rebuilt.execution_id, Some(id));
        assert_eq!(rebuilt.summary.total, 1);
        assert_eq!(rebuilt.summary.failed, 1);
        assert_eq!(rebuilt.summary.observations, 1);
    }
}
