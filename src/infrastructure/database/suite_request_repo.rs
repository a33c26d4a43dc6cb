//! SQLite implementation of the suite request repository.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::{
    QueueSnapshot, RequestedPhaseType, SuitePriority, SuiteRequest, SuiteRequestStatus,
};
use crate::domain::ports::errors::DatabaseError;
use crate::domain::ports::{SuiteRequestRepository, MAX_EXECUTION_HISTORY};
use crate::infrastructure::database::utils::parse_datetime;

pub struct SqliteSuiteRequestRepository {
    pool: SqlitePool,
}

impl SqliteSuiteRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> Result<SuiteRequest, DatabaseError> {
        let status_raw: String = row.get("status");
        let status = SuiteRequestStatus::from_str(&status_raw)
            .ok_or_else(|| DatabaseError::InvalidStoredValue(format!("status '{status_raw}'")))?;
        let priority_raw: String = row.get("priority");
        let priority = SuitePriority::from_str(&priority_raw).ok_or_else(|| {
            DatabaseError::InvalidStoredValue(format!("priority '{priority_raw}'"))
        })?;
        let requested_types: Vec<RequestedPhaseType> =
            serde_json::from_str(row.get::<String, _>("requested_types").as_str())?;

        Ok(SuiteRequest {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            scenario_name: row.get("scenario_name"),
            requested_types,
            coverage_target: row.get("coverage_target"),
            priority,
            status,
            estimated_queue_seconds: row.get("estimated_queue_seconds"),
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())?,
        })
    }
}

#[async_trait]
impl SuiteRequestRepository for SqliteSuiteRequestRepository {
    async fn insert(&self, request: &SuiteRequest) -> Result<(), DatabaseError> {
        let id = request.id.to_string();
        let requested_types = serde_json::to_string(&request.requested_types)?;
        let created_at = request.created_at.to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO suite_requests
                (id, scenario_name, requested_types, coverage_target, priority,
                 status, estimated_queue_seconds, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(&id)
        .bind(&request.scenario_name)
        .bind(&requested_types)
        .bind(request.coverage_target)
        .bind(request.priority.as_str())
        .bind(request.status.as_str())
        .bind(request.estimated_queue_seconds)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        debug!(request_id = %request.id, "suite request inserted");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SuiteRequest>, DatabaseError> {
        let row = sqlx::query("SELECT * FROM suite_requests WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_request).transpose()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<SuiteRequest>, DatabaseError> {
        // Same page-size cap as execution history.
        let limit = limit.clamp(1, MAX_EXECUTION_HISTORY);
        let rows = sqlx::query(
            "SELECT * FROM suite_requests ORDER BY created_at DESC, id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_request).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SuiteRequestStatus,
    ) -> Result<(), DatabaseError> {
        let froms: Vec<&str> = SuiteRequestStatus::all()
            .into_iter()
            .filter(|s| s.can_transition_to(status))
            .map(|s| s.as_str())
            .collect();

        // The legality check rides inside the UPDATE so concurrent writers
        // cannot race a stale read.
        let mut affected = 0;
        if !froms.is_empty() {
            let placeholders = (3..3 + froms.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE suite_requests SET status = ?1 WHERE id = ?2 AND status IN ({placeholders})"
            );
            let mut query = sqlx::query(&sql).bind(status.as_str()).bind(id.to_string());
            for from in &froms {
                query = query.bind(*from);
            }
            affected = query.execute(&self.pool).await?.rows_affected();
        }

        if affected == 0 {
            // Distinguish a missing row from an illegal transition.
            return match self.get(id).await? {
                None => Err(DatabaseError::RequestNotFound(id)),
                Some(current) => Err(DatabaseError::IllegalTransition {
                    id,
                    from: current.status.as_str().to_string(),
                    to: status.as_str().to_string(),
                }),
            };
        }
        debug!(request_id = %id, status = status.as_str(), "suite request status updated");
        Ok(())
    }

    async fn count_by_status(&self, status: SuiteRequestStatus) -> Result<i64, DatabaseError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM suite_requests WHERE status = ?1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    async fn status_snapshot(&self) -> Result<QueueSnapshot, DatabaseError> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS n FROM suite_requests GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut snapshot = QueueSnapshot::default();
        for row in &rows {
            let status: String = row.get("status");
            let n: i64 = row.get("n");
            match SuiteRequestStatus::from_str(&status) {
                Some(SuiteRequestStatus::Queued) => snapshot.queued = n,
                Some(SuiteRequestStatus::Delegated) => snapshot.delegated = n,
                Some(SuiteRequestStatus::Running) => snapshot.running = n,
                _ => {}
            }
        }

        let oldest: (Option<String>,) = sqlx::query_as(
            "SELECT MIN(created_at) FROM suite_requests WHERE status IN ('queued', 'delegated')",
        )
        .fetch_one(&self.pool)
        .await?;
        snapshot.oldest_waiting = oldest.0.as_deref().map(parse_datetime).transpose()?;

        Ok(snapshot)
    }
}
