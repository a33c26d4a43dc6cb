//! Repository port for persisted suite executions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::SuiteExecutionRecord;
use crate::domain::ports::errors::DatabaseError;

/// Upper bound for history listing limits.
pub const MAX_EXECUTION_HISTORY: i64 = 50;

#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Persist one completed run.
    async fn insert(&self, record: &SuiteExecutionRecord) -> Result<(), DatabaseError>;

    /// Executions for a scenario, newest completion first. Implementations
    /// clamp `limit` to `[1, MAX_EXECUTION_HISTORY]` and `offset` to >= 0.
    async fn list_recent(
        &self,
        scenario: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SuiteExecutionRecord>, DatabaseError>;

    /// Fetch one execution by id.
    async fn get(&self, id: Uuid) -> Result<Option<SuiteExecutionRecord>, DatabaseError>;

    /// The single newest execution across all scenarios.
    async fn latest(&self) -> Result<Option<SuiteExecutionRecord>, DatabaseError>;
}
