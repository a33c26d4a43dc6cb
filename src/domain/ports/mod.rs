//! Ports: interfaces the domain exposes for infrastructure to implement.

pub mod errors;
pub mod execution_repository;
pub mod phase_runner;
pub mod requirements_sync;
pub mod suite_request_repository;

pub use errors::DatabaseError;
pub use execution_repository::{ExecutionRepository, MAX_EXECUTION_HISTORY};
pub use phase_runner::PhaseRunner;
pub use requirements_sync::{NullRequirementsSync, RequirementsSync, SyncRequest};
pub use suite_request_repository::SuiteRequestRepository;
