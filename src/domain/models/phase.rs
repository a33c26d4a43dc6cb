//! Phase domain model.
//!
//! A phase is a single named stage of validation (structure, unit,
//! integration, ...) with its own runner, timeout, and failure
//! classification. Phases are registered in a catalog, selected into a
//! plan, and executed one at a time.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::domain::ports::PhaseRunner;

/// Normalize a raw phase name for lookup: trimmed and lowercased.
pub fn normalize_phase_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Where a phase definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseSource {
    /// Registered in the compile-time catalog.
    Native,
    /// Discovered as a `test-<phase>.sh` script under the phases directory.
    Script,
}

impl PhaseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Script => "script",
        }
    }
}

/// Coarse category of a phase failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Misconfiguration,
    MissingDependency,
    Timeout,
    System,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Misconfiguration => "misconfiguration",
            Self::MissingDependency => "missing_dependency",
            Self::Timeout => "timeout",
            Self::System => "system",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "misconfiguration" => Some(Self::Misconfiguration),
            "missing_dependency" => Some(Self::MissingDependency),
            "timeout" => Some(Self::Timeout),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// A phase definition: a catalog entry, possibly adjusted by per-scenario
/// config overrides before execution.
#[derive(Clone)]
pub struct PhaseDefinition {
    /// Normalized phase name.
    pub name: String,
    /// Callable that performs the phase's work.
    pub runner: Arc<dyn PhaseRunner>,
    /// Per-phase timeout budget. Zero means "use the global default".
    pub timeout: Duration,
    /// Deterministic ordering key.
    pub weight: u32,
    /// Optional phases are part of the canonical flow but tolerated absent.
    pub optional: bool,
    /// Human description for operator tooling.
    pub description: String,
    /// Native or script-backed.
    pub source: PhaseSource,
}

impl std::fmt::Debug for PhaseDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseDefinition")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("weight", &self.weight)
            .field("optional", &self.optional)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PhaseDefinition {
    /// Serializable metadata view of this definition.
    pub fn descriptor(&self) -> PhaseDescriptor {
        PhaseDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            weight: self.weight,
            optional: self.optional,
            source: self.source,
            default_timeout_seconds: self.timeout.as_secs(),
        }
    }
}

/// Serializable phase metadata, used by operator tooling and the
/// requirements-sync payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDescriptor {
    pub name: String,
    pub description: String,
    pub weight: u32,
    pub optional: bool,
    pub source: PhaseSource,
    pub default_timeout_seconds: u64,
}

/// Everything a runner needs to do its work: the resolved workspace
/// paths, the artifact directory, and the parent cancellation token.
#[derive(Debug, Clone)]
pub struct PhaseContext {
    pub scenario_name: String,
    pub scenario_dir: PathBuf,
    pub test_dir: PathBuf,
    pub phases_dir: PathBuf,
    pub app_root: PathBuf,
    pub artifact_dir: PathBuf,
    pub cancel: CancellationToken,
}

/// A structured phase failure as reported by a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseFailure {
    pub message: String,
    /// When None, the orchestrator defaults the classification to `system`.
    pub classification: Option<FailureClass>,
    /// When None, the orchestrator supplies a generic remediation hint.
    pub remediation: Option<String>,
}

impl PhaseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            classification: None,
            remediation: None,
        }
    }

    pub fn classified(
        message: impl Into<String>,
        classification: FailureClass,
        remediation: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            classification: Some(classification),
            remediation: Some(remediation.into()),
        }
    }
}

/// What a runner hands back: an outcome plus the ordered list of
/// observations describing what was verified.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub outcome: Result<(), PhaseFailure>,
    pub observations: Vec<String>,
}

impl PhaseReport {
    pub fn passed(observations: Vec<String>) -> Self {
        Self {
            outcome: Ok(()),
            observations,
        }
    }

    pub fn failed(failure: PhaseFailure, observations: Vec<String>) -> Self {
        Self {
            outcome: Err(failure),
            observations,
        }
    }
}

/// Terminal status of one executed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Passed,
    Failed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Persisted per-phase outcome.
///
/// Invariant: `status == Passed` iff `error` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: String,
    pub status: PhaseStatus,
    pub duration_seconds: i64,
    /// Project-root-relative when that computation succeeds, absolute
    /// otherwise.
    pub log_path: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub classification: Option<FailureClass>,
    #[serde(default)]
    pub remediation: String,
    #[serde(default)]
    pub observations: Vec<String>,
}

impl PhaseResult {
    pub fn passed(&self) -> bool {
        self.status == PhaseStatus::Passed
    }
}

/// Aggregated view of a phase-result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_seconds: i64,
    pub observations: usize,
}

/// Pure aggregation over a phase-result list.
pub fn summarize_phases(results: &[PhaseResult]) -> PhaseSummary {
    let mut summary = PhaseSummary {
        total: results.len(),
        ..PhaseSummary::default()
    };
    for result in results {
        if result.passed() {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
        summary.duration_seconds += result.duration_seconds.max(0);
        summary.observations += result.observations.len();
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(phase: &str, status: PhaseStatus, duration: i64, observations: usize) -> PhaseResult {
        PhaseResult {
            phase: phase.to_string(),
            status,
            duration_seconds: duration,
            log_path: format!("artifacts/{phase}.log"),
            error: if status == PhaseStatus::Failed {
                "boom".to_string()
            } else {
                String::new()
            },
            classification: None,
            remediation: String::new(),
            observations: (0..observations).map(|i| format!("check {i}")).collect(),
        }
    }

    #[test]
    fn test_normalize_phase_name() {
        assert_eq!(normalize_phase_name("  Unit "), "unit");
        assert_eq!(normalize_phase_name("INTEGRATION"), "integration");
        assert_eq!(normalize_phase_name(""), "");
    }

    #[test]
    fn test_failure_class_round_trip() {
        for class in [
            FailureClass::Misconfiguration,
            FailureClass::MissingDependency,
            FailureClass::Timeout,
            FailureClass::System,
        ] {
            assert_eq!(FailureClass::from_str(class.as_str()), Some(class));
        }
        assert_eq!(FailureClass::from_str("ghost"), None);
    }

    #[test]
    fn test_summarize_counts_add_up() {
        let results = vec![
            result("structure", PhaseStatus::Passed, 2, 3),
            result("unit", PhaseStatus::Failed, 7, 1),
            result("integration", PhaseStatus::Passed, 4, 0),
        ];
        let summary = summarize_phases(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed + summary.failed, summary.total);
        assert_eq!(summary.duration_seconds, 13);
        assert_eq!(summary.observations, 4);
    }

    #[test]
    fn test_summarize_clamps_negative_durations() {
        let mut bad = result("unit", PhaseStatus::Passed, 5, 0);
        bad.duration_seconds = -3;
        let summary = summarize_phases(&[bad]);
        assert_eq!(summary.duration_seconds, 0);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize_phases(&[]);
        assert_eq!(summary, PhaseSummary::default());
    }

    #[test]
    fn test_phase_result_serde_round_trip() {
        let original = result("business", PhaseStatus::Failed, 9, 2);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: PhaseResult = serde_json::from_str(&json).unwrap();
        assert_eq!(original, parsed);
    }
}
