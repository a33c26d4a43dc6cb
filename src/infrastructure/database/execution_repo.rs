//! SQLite implementation of the execution repository.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::{PhaseResult, SuiteExecutionRecord};
use crate::domain::ports::errors::DatabaseError;
use crate::domain::ports::{ExecutionRepository, MAX_EXECUTION_HISTORY};
use crate::infrastructure::database::utils::parse_datetime;

pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<SuiteExecutionRecord, DatabaseError> {
        let phases: Vec<PhaseResult> =
            serde_json::from_str(row.get::<String, _>("phase_results").as_str())?;
        let suite_request_id = row
            .get::<Option<String>, _>("suite_request_id")
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()?;

        Ok(SuiteExecutionRecord {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            suite_request_id,
            scenario_name: row.get("scenario_name"),
            preset_used: row.get("preset_used"),
            started_at: parse_datetime(row.get::<String, _>("started_at").as_str())?,
            completed_at: parse_datetime(row.get::<String, _>("completed_at").as_str())?,
            success: row.get::<i64, _>("success") != 0,
            phases,
        })
    }
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn insert(&self, record: &SuiteExecutionRecord) -> Result<(), DatabaseError> {
        let id = record.id.to_string();
        let suite_request_id = record.suite_request_id.map(|id| id.to_string());
        let started_at = record.started_at.to_rfc3339();
        let completed_at = record.completed_at.to_rfc3339();
        let phases = serde_json::to_string(&record.phases)?;

        sqlx::query(
            r"
            INSERT INTO suite_executions
                (id, suite_request_id, scenario_name, preset_used,
                 started_at, completed_at, success, phase_results)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(&id)
        .bind(&suite_request_id)
        .bind(&record.scenario_name)
        .bind(&record.preset_used)
        .bind(&started_at)
        .bind(&completed_at)
        .bind(i64::from(record.success))
        .bind(&phases)
        .execute(&self.pool)
        .await?;

        debug!(execution_id = %record.id, "execution inserted");
        Ok(())
    }

    async fn list_recent(
        &self,
        scenario: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SuiteExecutionRecord>, DatabaseError> {
        let limit = limit.clamp(1, MAX_EXECUTION_HISTORY);
        let offset = offset.max(0);
        let rows = sqlx::query(
            r"
            SELECT * FROM suite_executions
            WHERE scenario_name = ?1
            ORDER BY completed_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            ",
        )
        .bind(scenario)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<SuiteExecutionRecord>, DatabaseError> {
        let row = sqlx::query("SELECT * FROM suite_executions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn latest(&self) -> Result<Option<SuiteExecutionRecord>, DatabaseError> {
        let row = sqlx::query(
            "SELECT * FROM suite_executions ORDER BY completed_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_record).transpose()
    }
}
