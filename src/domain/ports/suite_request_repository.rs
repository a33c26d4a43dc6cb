//! Repository port for the suite request queue.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{QueueSnapshot, SuiteRequest, SuiteRequestStatus};
use crate::domain::ports::errors::DatabaseError;

#[async_trait]
pub trait SuiteRequestRepository: Send + Sync {
    /// Insert a newly created request.
    async fn insert(&self, request: &SuiteRequest) -> Result<(), DatabaseError>;

    /// Fetch one request by id.
    async fn get(&self, id: Uuid) -> Result<Option<SuiteRequest>, DatabaseError>;

    /// Recent requests, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<SuiteRequest>, DatabaseError>;

    /// Conditionally transition a request's status.
    ///
    /// The write must be atomic at the row level: it only applies when the
    /// current status legally transitions to `status`. An absent row yields
    /// `RequestNotFound`; a present row in an incompatible state yields
    /// `IllegalTransition`.
    async fn update_status(
        &self,
        id: Uuid,
        status: SuiteRequestStatus,
    ) -> Result<(), DatabaseError>;

    /// Count requests currently in the given status.
    async fn count_by_status(&self, status: SuiteRequestStatus) -> Result<i64, DatabaseError>;

    /// Per-status counts plus the oldest still-waiting timestamp.
    async fn status_snapshot(&self) -> Result<QueueSnapshot, DatabaseError>;
}
