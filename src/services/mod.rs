//! Service layer: phase execution, planning, orchestration, and the
//! queue/history services over the repository ports.

pub mod catalog;
pub mod execution_service;
pub mod history_service;
pub mod orchestrator;
pub mod phase_runner;
pub mod plan_builder;
pub mod preset_resolver;
pub mod queue_service;
pub mod runners;

pub use catalog::{default_catalog, PhaseCatalog, PhaseSpec, DEFAULT_PHASE_TIMEOUT};
pub use execution_service::ExecutionService;
pub use history_service::HistoryService;
pub use orchestrator::SuiteOrchestrator;
pub use phase_runner::PhaseExecutor;
pub use plan_builder::PlanBuilder;
pub use preset_resolver::{resolve_presets, PRESETS_FILE};
pub use queue_service::{NewSuiteRequest, QueueService};
pub use runners::{
    DependenciesRunner, ScriptDelegateRunner, ScriptRunner, StructureRunner, APP_ROOT_ENV,
    SCENARIO_DIR_ENV,
};
