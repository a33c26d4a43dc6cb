//! Requirements sync over an external process.
//!
//! The collaborator is any executable that reads the sync payload as
//! JSON on stdin. Its runtime is bounded by a timeout and the caller's
//! cancellation token.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{RequirementsSync, SyncRequest};

/// Default bound on the external tool's runtime.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(60);

/// Invokes an external command with the sync payload on stdin.
pub struct ProcessRequirementsSync {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessRequirementsSync {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_tool(&self, payload: String, cwd: &std::path::Path) -> DomainResult<()> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::system(format!("failed to start {}: {e}", self.command))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(payload.as_bytes())
                .await
                .map_err(|e| DomainError::system(format!("failed to write sync payload: {e}")))?;
            // Closing stdin signals end of payload.
            drop(stdin);
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::system(format!("failed to wait for {}: {e}", self.command)))?;
        if !status.success() {
            return Err(DomainError::system(format!(
                "{} exited with status {}",
                self.command,
                status.code().map_or_else(|| "signal".to_string(), |c| c.to_string())
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RequirementsSync for ProcessRequirementsSync {
    #[instrument(skip(self, cancel, request), fields(scenario = %request.scenario_name))]
    async fn sync(&self, cancel: &CancellationToken, request: SyncRequest) -> DomainResult<()> {
        let cwd = request.scenario_dir.clone();
        let payload = serde_json::to_string(&request)?;
        debug!(bytes = payload.len(), command = %self.command, "invoking requirements sync");

        tokio::select! {
            () = cancel.cancelled() => {
                Err(DomainError::system("requirements sync canceled"))
            }
            timed = tokio::time::timeout(self.timeout, self.run_tool(payload, &cwd)) => {
                match timed {
                    Ok(outcome) => outcome,
                    Err(_) => Err(DomainError::system(format!(
                        "requirements sync timed out after {}s",
                        self.timeout.as_secs()
                    ))),
                }
            }
        }
    }
}
