//! Infrastructure layer: adapters satisfying the domain ports.
//!
//! - SQLite persistence (sqlx)
//! - Configuration loading (figment)
//! - Logging initialization (tracing)
//! - Process-backed requirements sync

pub mod config;
pub mod database;
pub mod logging;
pub mod sync;
