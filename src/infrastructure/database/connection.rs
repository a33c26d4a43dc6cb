//! SQLite connection pool management.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::domain::ports::errors::DatabaseError;

/// Database connection pool manager.
///
/// Manages a `SQLite` pool with WAL mode enabled for concurrent access.
/// Handles connection lifecycle and migrations.
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// Create a new connection pool.
    ///
    /// `database_url` is a `SQLite` URL, e.g. `sqlite:.genie/genie.db`
    /// or `sqlite::memory:`. WAL journaling, NORMAL synchronous mode,
    /// and foreign keys are enabled; a 5 second busy timeout covers
    /// lock contention.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let max_connections = max_connections.max(1);
        let pool = SqlitePoolOptions::new()
            .min_connections(max_connections.min(5))
            .max_connections(max_connections)
            .idle_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Apply all pending migrations. Safe to call repeatedly.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        Ok(())
    }

    /// The pool reference to hand to repository implementations.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections; call during shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
