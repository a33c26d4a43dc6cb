//! Suite request queue service.
//!
//! Validates and admits new suite requests, exposes queue status, and
//! funnels every status change through the repository's conditional
//! transition write.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    valid_scenario_name, ExecutionConfig, QueueSnapshot, RequestedPhaseType, SuitePriority,
    SuiteRequest, SuiteRequestStatus, DEFAULT_COVERAGE_TARGET,
};
use crate::domain::ports::SuiteRequestRepository;

/// Caller-facing submission payload. Omitted fields take queue defaults.
#[derive(Debug, Clone, Default)]
pub struct NewSuiteRequest {
    pub scenario_name: String,
    pub requested_types: Vec<RequestedPhaseType>,
    /// Integer percentage in [0, 100]; defaults to 95.
    pub coverage_target: Option<i64>,
    pub priority: SuitePriority,
}

impl NewSuiteRequest {
    pub fn for_scenario(scenario_name: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            ..Self::default()
        }
    }
}

/// Queue wait estimate: a floor plus a per-item cost for everything
/// already waiting.
pub(crate) fn estimate_queue_seconds(config: &ExecutionConfig, queued_count: i64) -> i64 {
    config
        .queue_base_latency_secs
        .max(queued_count.max(0) * config.queue_per_item_latency_secs)
}

/// Admission and lifecycle management for suite requests.
pub struct QueueService {
    repository: Arc<dyn SuiteRequestRepository>,
    config: ExecutionConfig,
}

impl QueueService {
    pub fn new(repository: Arc<dyn SuiteRequestRepository>, config: ExecutionConfig) -> Self {
        Self { repository, config }
    }

    /// Validate and enqueue a new suite request.
    #[instrument(skip(self, new_request), fields(scenario = %new_request.scenario_name))]
    pub async fn submit(&self, new_request: NewSuiteRequest) -> DomainResult<SuiteRequest> {
        let scenario_name = new_request.scenario_name.trim().to_string();
        if scenario_name.is_empty() {
            return Err(DomainError::validation("scenario name cannot be empty"));
        }
        if !valid_scenario_name(&scenario_name) {
            return Err(DomainError::validation(format!(
                "scenario name '{scenario_name}' may only contain letters, digits, '_' and '-'"
            )));
        }

        let coverage_target = new_request.coverage_target.unwrap_or(DEFAULT_COVERAGE_TARGET);
        if !(0..=100).contains(&coverage_target) {
            return Err(DomainError::validation(format!(
                "coverage target must be between 0 and 100, got {coverage_target}"
            )));
        }

        let requested_types = if new_request.requested_types.is_empty() {
            RequestedPhaseType::defaults()
        } else {
            // Drop repeats wherever they appear, keeping first-seen order.
            let mut types: Vec<RequestedPhaseType> = Vec::new();
            for ty in new_request.requested_types {
                if !types.contains(&ty) {
                    types.push(ty);
                }
            }
            types
        };

        let queued = self
            .repository
            .count_by_status(SuiteRequestStatus::Queued)
            .await
            .map_err(DomainError::from)?;

        let request = SuiteRequest {
            id: Uuid::new_v4(),
            scenario_name,
            requested_types,
            coverage_target,
            priority: new_request.priority,
            status: SuiteRequestStatus::Queued,
            estimated_queue_seconds: estimate_queue_seconds(&self.config, queued),
            created_at: Utc::now(),
        };
        self.repository.insert(&request).await?;
        info!(
            request_id = %request.id,
            estimated_queue_seconds = request.estimated_queue_seconds,
            "suite request queued"
        );
        Ok(request)
    }

    /// Fetch a request, failing with `not_found` when absent.
    pub async fn get(&self, id: Uuid) -> DomainResult<SuiteRequest> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("suite request {id} not found")))
    }

    /// Recent requests, newest first.
    pub async fn list_recent(&self, limit: i64) -> DomainResult<Vec<SuiteRequest>> {
        Ok(self.repository.list_recent(limit).await?)
    }

    /// Transition a request through its lifecycle. Illegal transitions
    /// surface as validation errors; the updated request is returned.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: Uuid,
        status: SuiteRequestStatus,
    ) -> DomainResult<SuiteRequest> {
        self.repository.update_status(id, status).await?;
        info!(request_id = %id, status = status.as_str(), "suite request transitioned");
        self.get(id).await
    }

    /// Withdraw a request before it reaches a terminal state.
    pub async fn cancel(&self, id: Uuid) -> DomainResult<SuiteRequest> {
        self.transition(id, SuiteRequestStatus::Canceled).await
    }

    /// Per-status counts plus the oldest still-waiting timestamp.
    pub async fn snapshot(&self) -> DomainResult<QueueSnapshot> {
        Ok(self.repository.status_snapshot().await?)
    }
}
