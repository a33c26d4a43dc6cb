//! Suite request domain model.
//!
//! A suite request is a queued entry representing a caller's desire to run
//! validation for a scenario; distinct from an execution, which is one
//! concrete run of the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a suite request in the queue lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteRequestStatus {
    /// Created, waiting to be picked up.
    Queued,
    /// Handed off to a worker but not yet executing.
    Delegated,
    /// Execution in progress.
    Running,
    /// Execution finished successfully.
    Completed,
    /// Execution finished with failures or errored.
    Failed,
    /// Withdrawn before reaching a terminal execution state.
    Canceled,
}

impl Default for SuiteRequestStatus {
    fn default() -> Self {
        Self::Queued
    }
}

impl SuiteRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Delegated => "delegated",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "queued" => Some(Self::Queued),
            "delegated" => Some(Self::Delegated),
            "running" => Some(Self::Running),
            "completed" | "complete" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "canceled" | "cancelled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub fn all() -> [Self; 6] {
        [
            Self::Queued,
            Self::Delegated,
            Self::Running,
            Self::Completed,
            Self::Failed,
            Self::Canceled,
        ]
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }

    /// Valid transitions from this status. Terminal statuses never
    /// transition again.
    pub fn valid_transitions(&self) -> Vec<SuiteRequestStatus> {
        match self {
            Self::Queued => vec![Self::Delegated, Self::Running, Self::Failed, Self::Canceled],
            Self::Delegated => vec![Self::Running, Self::Failed, Self::Canceled],
            Self::Running => vec![Self::Completed, Self::Failed, Self::Canceled],
            Self::Completed | Self::Failed | Self::Canceled => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Priority of a suite request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitePriority {
    Low,
    Normal,
    High,
}

impl Default for SuitePriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl SuitePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// The kinds of validation a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedPhaseType {
    Unit,
    Integration,
    E2e,
    Performance,
    Security,
}

impl RequestedPhaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::E2e => "e2e",
            Self::Performance => "performance",
            Self::Security => "security",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unit" => Some(Self::Unit),
            "integration" => Some(Self::Integration),
            "e2e" => Some(Self::E2e),
            "performance" => Some(Self::Performance),
            "security" => Some(Self::Security),
            _ => None,
        }
    }

    /// Defaults applied when the caller requests no types.
    pub fn defaults() -> Vec<Self> {
        vec![Self::Unit, Self::Integration]
    }
}

/// Default coverage target percentage.
pub const DEFAULT_COVERAGE_TARGET: i64 = 95;

/// A queued validation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteRequest {
    pub id: Uuid,
    pub scenario_name: String,
    pub requested_types: Vec<RequestedPhaseType>,
    /// Integer percentage in [0, 100].
    pub coverage_target: i64,
    pub priority: SuitePriority,
    pub status: SuiteRequestStatus,
    pub estimated_queue_seconds: i64,
    pub created_at: DateTime<Utc>,
}

impl SuiteRequest {
    pub fn can_transition_to(&self, new_status: SuiteRequestStatus) -> bool {
        self.status.can_transition_to(new_status)
    }
}

/// Counts of requests per non-terminal status plus the timestamp of the
/// oldest request still waiting for execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub queued: i64,
    pub delegated: i64,
    pub running: i64,
    pub oldest_waiting: Option<DateTime<Utc>>,
}
