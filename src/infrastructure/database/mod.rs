//! SQLite persistence adapters for the repository ports.

pub mod connection;
pub mod execution_repo;
pub mod suite_request_repo;
pub mod utils;

pub use connection::DatabaseConnection;
pub use execution_repo::SqliteExecutionRepository;
pub use suite_request_repo::SqliteSuiteRequestRepository;

pub use crate::domain::ports::errors::DatabaseError;
