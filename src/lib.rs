//! Test Genie - Suite Orchestrator
//!
//! Test Genie runs phased validation suites against scenario workspaces:
//! a catalog of native and script-backed phases is planned, executed
//! sequentially under timeouts and cancellation, and every run is
//! recorded. A SQLite-backed queue tracks suite requests through their
//! status lifecycle.
//!
//! # Architecture
//!
//! The crate follows Clean Architecture / Hexagonal Architecture
//! principles:
//!
//! - **Domain Layer** (`domain`): models, invariants, and ports
//! - **Service Layer** (`services`): planning, orchestration, queue and
//!   history services
//! - **Infrastructure Layer** (`infrastructure`): SQLite adapters,
//!   config loading, logging, process-backed requirements sync
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use test_genie::domain::models::SuiteExecutionRequest;
//! use test_genie::domain::ports::NullRequirementsSync;
//! use test_genie::services::{default_catalog, SuiteOrchestrator, DEFAULT_PHASE_TIMEOUT};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = SuiteOrchestrator::new(
//!         "scenarios".into(),
//!         default_catalog(DEFAULT_PHASE_TIMEOUT),
//!         DEFAULT_PHASE_TIMEOUT,
//!         Arc::new(NullRequirementsSync),
//!     );
//!     let request = SuiteExecutionRequest::for_scenario("demo");
//!     let result = orchestrator.run(&request, CancellationToken::new()).await?;
//!     println!("success: {}", result.success);
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    GenieConfig, PhaseResult, PhaseStatus, PhaseSummary, ScenarioConfig, ScenarioWorkspace,
    SuiteExecutionRequest, SuiteExecutionResult, SuiteRequest, SuiteRequestStatus,
};
pub use domain::ports::{
    ExecutionRepository, NullRequirementsSync, PhaseRunner, RequirementsSync,
    SuiteRequestRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::database::{
    DatabaseConnection, SqliteExecutionRepository, SqliteSuiteRequestRepository,
};
pub use services::{
    default_catalog, ExecutionService, HistoryService, PhaseCatalog, QueueService,
    SuiteOrchestrator,
};
