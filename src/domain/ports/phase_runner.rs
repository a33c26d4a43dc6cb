//! Port for phase runners.
//!
//! A runner performs one phase's work given its context and a log sink.
//! Runners must honor cancellation at least cooperatively; the executor
//! additionally bounds them with the phase timeout and recovers from
//! panics at this boundary.

use async_trait::async_trait;
use tokio::fs::File;

use crate::domain::models::{PhaseContext, PhaseReport};

#[async_trait]
pub trait PhaseRunner: Send + Sync {
    /// Run the phase, writing progress to `log`, and report the outcome.
    async fn run(&self, ctx: PhaseContext, log: File) -> PhaseReport;
}
