//! Port for the requirements-sync collaborator.
//!
//! Requirements sync is an external tool invoked after canonical full
//! runs. Its only contract is that it must not block indefinitely; the
//! orchestrator bounds it with the parent cancellation token and treats
//! failures as best-effort.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::DomainResult;
use crate::domain::models::{PhaseDescriptor, PhaseResult};

/// Payload handed to the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub scenario_name: String,
    pub scenario_dir: PathBuf,
    /// The full discovered definition list for the run.
    pub definitions: Vec<PhaseDescriptor>,
    pub phase_results: Vec<PhaseResult>,
    /// Descriptor of the invocation that produced the run, one token line
    /// plus the phase order.
    pub command_history: Vec<String>,
}

#[async_trait]
pub trait RequirementsSync: Send + Sync {
    async fn sync(&self, cancel: &CancellationToken, request: SyncRequest) -> DomainResult<()>;
}

/// No-op collaborator for callers that do not wire the external tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRequirementsSync;

#[async_trait]
impl RequirementsSync for NullRequirementsSync {
    async fn sync(&self, _cancel: &CancellationToken, _request: SyncRequest) -> DomainResult<()> {
        Ok(())
    }
}
