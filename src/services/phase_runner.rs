//! Phase execution: one phase at a time, under a timeout, with panic
//! isolation and per-phase log capture.

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::fs::File;
use tracing::{debug, warn};

use crate::domain::models::{
    FailureClass, PhaseContext, PhaseDefinition, PhaseFailure, PhaseReport, PhaseResult,
    PhaseStatus,
};

/// Fallback remediation for failures without a specific hint.
const GENERIC_REMEDIATION: &str = "Refer to the phase logs to triage the failure.";

enum Outcome {
    Report(PhaseReport),
    TimedOut,
    Canceled,
    Panicked(String),
}

/// Runs phase definitions to completion and translates every way a phase
/// can end into a `PhaseResult`.
#[derive(Debug, Clone, Copy)]
pub struct PhaseExecutor {
    default_timeout: Duration,
}

impl PhaseExecutor {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    /// Execute one phase. Never returns an error: infrastructure
    /// failures (log creation, timeouts, panics) become failed results
    /// so the suite can keep an accurate record.
    pub async fn execute(&self, definition: &PhaseDefinition, ctx: &PhaseContext) -> PhaseResult {
        let log_name = format!(
            "{}-{}.log",
            Utc::now().format("%Y%m%d-%H%M%S"),
            definition.name
        );
        let log_path = ctx.artifact_dir.join(&log_name);
        // Stored root-relative so records stay meaningful across hosts.
        let display_path = log_path
            .strip_prefix(&ctx.app_root)
            .map_or_else(|_| log_path.display().to_string(), |p| p.display().to_string());

        let budget = if definition.timeout.is_zero() {
            self.default_timeout
        } else {
            definition.timeout
        };
        debug!(
            phase = %definition.name,
            timeout_secs = budget.as_secs(),
            "starting phase"
        );

        let started = Instant::now();
        let log = match File::create(&log_path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(phase = %definition.name, error = %e, "failed to create phase log");
                return self.finish(
                    definition,
                    display_path,
                    started,
                    Outcome::Report(PhaseReport::failed(
                        PhaseFailure::new(format!(
                            "failed to create log file {}: {e}",
                            log_path.display()
                        )),
                        Vec::new(),
                    )),
                );
            }
        };

        let runner = definition.runner.clone();
        let runner_ctx = ctx.clone();
        // A panicking runner must fail its phase, not tear down the suite.
        let mut handle = tokio::spawn(async move { runner.run(runner_ctx, log).await });

        let outcome = tokio::select! {
            () = ctx.cancel.cancelled() => {
                handle.abort();
                Outcome::Canceled
            }
            joined = tokio::time::timeout(budget, &mut handle) => match joined {
                Ok(Ok(report)) => Outcome::Report(report),
                Ok(Err(join_err)) if join_err.is_panic() => {
                    Outcome::Panicked(join_err.to_string())
                }
                Ok(Err(_)) => Outcome::Canceled,
                Err(_) => {
                    handle.abort();
                    Outcome::TimedOut
                }
            },
        };

        self.finish(definition, display_path, started, outcome)
    }

    fn finish(
        &self,
        definition: &PhaseDefinition,
        log_path: String,
        started: Instant,
        outcome: Outcome,
    ) -> PhaseResult {
        let duration_seconds = i64::try_from(started.elapsed().as_secs()).unwrap_or(i64::MAX);
        let budget = if definition.timeout.is_zero() {
            self.default_timeout
        } else {
            definition.timeout
        };

        let (report, error, classification, remediation) = match outcome {
            Outcome::Report(report) => match report.outcome.clone() {
                Ok(()) => {
                    return PhaseResult {
                        phase: definition.name.clone(),
                        status: PhaseStatus::Passed,
                        duration_seconds,
                        log_path,
                        error: String::new(),
                        classification: None,
                        remediation: String::new(),
                        observations: report.observations,
                    };
                }
                Err(failure) => (
                    report,
                    failure.message,
                    failure.classification.unwrap_or(FailureClass::System),
                    failure
                        .remediation
                        .unwrap_or_else(|| GENERIC_REMEDIATION.to_string()),
                ),
            },
            Outcome::TimedOut => (
                PhaseReport::failed(
                    PhaseFailure::new("timed out"),
                    Vec::new(),
                ),
                format!("phase timed out after {}s", budget.as_secs()),
                FailureClass::Timeout,
                "Increase the timeout or break the phase into smaller steps.".to_string(),
            ),
            Outcome::Canceled => (
                PhaseReport::failed(
                    PhaseFailure::new("canceled"),
                    Vec::new(),
                ),
                "phase canceled".to_string(),
                FailureClass::System,
                GENERIC_REMEDIATION.to_string(),
            ),
            Outcome::Panicked(detail) => {
                warn!(phase = %definition.name, %detail, "phase runner panicked");
                (
                    PhaseReport::failed(
                        PhaseFailure::new("panicked"),
                        Vec::new(),
                    ),
                    format!("phase runner panicked: {detail}"),
                    FailureClass::System,
                    GENERIC_REMEDIATION.to_string(),
                )
            }
        };

        PhaseResult {
            phase: definition.name.clone(),
            status: PhaseStatus::Failed,
            duration_seconds,
            log_path,
            error,
            classification: Some(classification),
            remediation,
            observations: report.observations,
        }
    }
}
