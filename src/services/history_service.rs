//! Execution history queries.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ExecutionConfig, SuiteExecutionResult};
use crate::domain::ports::ExecutionRepository;

/// Read-side view over persisted executions. Summaries are recomputed
/// from the stored phase lists on every read.
pub struct HistoryService {
    executions: Arc<dyn ExecutionRepository>,
    max_history: i64,
}

impl HistoryService {
    pub fn new(executions: Arc<dyn ExecutionRepository>, config: &ExecutionConfig) -> Self {
        Self {
            executions,
            max_history: config.max_execution_history.max(1),
        }
    }

    /// Executions for a scenario, newest completion first. `limit` is
    /// clamped to `[1, max_execution_history]`; a negative `offset` reads
    /// from the start.
    pub async fn list(
        &self,
        scenario: &str,
        limit: i64,
        offset: i64,
    ) -> DomainResult<Vec<SuiteExecutionResult>> {
        let scenario = scenario.trim();
        if scenario.is_empty() {
            return Err(DomainError::validation("scenario name cannot be empty"));
        }
        let limit = limit.clamp(1, self.max_history);
        let offset = offset.max(0);
        let records = self.executions.list_recent(scenario, limit, offset).await?;
        Ok(records.into_iter().map(|r| r.into_result()).collect())
    }

    /// Fetch one execution, failing with `not_found` when absent.
    pub async fn get(&self, id: Uuid) -> DomainResult<SuiteExecutionResult> {
        self.executions
            .get(id)
            .await?
            .map(|r| r.into_result())
            .ok_or_else(|| DomainError::not_found(format!("execution {id} not found")))
    }

    /// The newest execution across all scenarios, if any.
    pub async fn latest(&self) -> DomainResult<Option<SuiteExecutionResult>> {
        Ok(self.executions.latest().await?.map(|r| r.into_result()))
    }
}
