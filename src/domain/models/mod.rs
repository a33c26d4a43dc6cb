//! Domain models: pure data and invariants, no I/O beyond workspace and
//! scenario-config resolution.

pub mod config;
pub mod execution;
pub mod phase;
pub mod plan;
pub mod scenario_config;
pub mod suite_request;
pub mod workspace;

pub use config::{DatabaseConfig, ExecutionConfig, GenieConfig, LoggingConfig};
pub use execution::{SuiteExecutionRecord, SuiteExecutionResult};
pub use phase::{
    normalize_phase_name, summarize_phases, FailureClass, PhaseContext, PhaseDefinition,
    PhaseDescriptor, PhaseFailure, PhaseReport, PhaseResult, PhaseSource, PhaseStatus,
    PhaseSummary,
};
pub use plan::{PhasePlan, SuiteExecutionRequest};
pub use scenario_config::{parse_duration, PhaseOverride, ScenarioConfig, SCENARIO_CONFIG_FILE};
pub use suite_request::{
    QueueSnapshot, RequestedPhaseType, SuitePriority, SuiteRequest, SuiteRequestStatus,
    DEFAULT_COVERAGE_TARGET,
};
pub use workspace::{valid_scenario_name, ScenarioWorkspace, ARTIFACT_DIR_NAME};
