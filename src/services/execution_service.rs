//! Execution service: runs suites and persists their outcomes, driving
//! queued requests through their status lifecycle.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    SuiteExecutionRecord, SuiteExecutionRequest, SuiteExecutionResult, SuiteRequestStatus,
};
use crate::domain::ports::{ExecutionRepository, SuiteRequestRepository};
use crate::services::orchestrator::SuiteOrchestrator;

/// Runs suites via the orchestrator and records every completed run.
pub struct ExecutionService {
    orchestrator: Arc<SuiteOrchestrator>,
    requests: Arc<dyn SuiteRequestRepository>,
    executions: Arc<dyn ExecutionRepository>,
}

impl ExecutionService {
    pub fn new(
        orchestrator: Arc<SuiteOrchestrator>,
        requests: Arc<dyn SuiteRequestRepository>,
        executions: Arc<dyn ExecutionRepository>,
    ) -> Self {
        Self {
            orchestrator,
            requests,
            executions,
        }
    }

    /// Run a suite directly and persist the outcome. The returned result
    /// carries the persisted execution id.
    #[instrument(skip(self, request, cancel), fields(scenario = %request.scenario_name))]
    pub async fn run(
        &self,
        request: &SuiteExecutionRequest,
        cancel: CancellationToken,
    ) -> DomainResult<SuiteExecutionResult> {
        let mut result = self.orchestrator.run(request, cancel).await?;
        let id = Uuid::new_v4();
        let record = SuiteExecutionRecord::from_result(id, request.suite_request_id, &result);
        self.executions.insert(&record).await?;
        result.execution_id = Some(id);
        info!(execution_id = %id, success = result.success, "execution recorded");
        Ok(result)
    }

    /// Run the suite for a queued request, walking the request through
    /// running and into its terminal status.
    ///
    /// The request's scenario must match the execution request; a mismatch
    /// is rejected before any transition or record is written.
    #[instrument(skip(self, request, cancel), fields(request_id = %request_id))]
    pub async fn execute_queued(
        &self,
        request_id: Uuid,
        request: &SuiteExecutionRequest,
        cancel: CancellationToken,
    ) -> DomainResult<SuiteExecutionResult> {
        let queued = self
            .requests
            .get(request_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("suite request {request_id} not found")))?;

        // Scenario names compare case-insensitively, matching phase and
        // preset lookup.
        if !queued
            .scenario_name
            .eq_ignore_ascii_case(request.scenario_name.trim())
        {
            return Err(DomainError::validation(format!(
                "suite request {request_id} is for scenario '{}', not '{}'",
                queued.scenario_name, request.scenario_name
            )));
        }

        self.requests
            .update_status(request_id, SuiteRequestStatus::Running)
            .await?;

        let mut linked = request.clone();
        linked.suite_request_id = Some(request_id);
        let result = match self.run(&linked, cancel).await {
            Ok(result) => result,
            Err(e) => {
                self.finish(request_id, SuiteRequestStatus::Failed).await;
                return Err(e);
            }
        };

        let terminal = if result.success {
            SuiteRequestStatus::Completed
        } else {
            SuiteRequestStatus::Failed
        };
        self.finish(request_id, terminal).await;
        Ok(result)
    }

    /// Terminal transitions are best effort: a request withdrawn mid-run
    /// already reached a terminal status, and the execution record is the
    /// source of truth for the outcome.
    async fn finish(&self, request_id: Uuid, status: SuiteRequestStatus) {
        if let Err(e) = self.requests.update_status(request_id, status).await {
            warn!(
                request_id = %request_id,
                status = status.as_str(),
                error = %e,
                "terminal status transition failed"
            );
        }
    }
}
