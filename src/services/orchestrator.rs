//! Suite orchestration: the single sequential driver for a run.
//!
//! The orchestrator resolves the workspace, builds the plan, executes the
//! selected phases one at a time, and assembles the execution result. It
//! never persists anything itself; the execution service layers storage
//! and queue transitions on top.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    summarize_phases, PhasePlan, ScenarioWorkspace, SuiteExecutionRequest, SuiteExecutionResult,
};
use crate::domain::models::{PhaseContext, PhaseResult, ScenarioConfig};
use crate::domain::ports::{RequirementsSync, SyncRequest};
use crate::services::catalog::PhaseCatalog;
use crate::services::phase_runner::PhaseExecutor;
use crate::services::plan_builder::PlanBuilder;

/// Orchestrates one suite run end to end.
pub struct SuiteOrchestrator {
    scenarios_root: PathBuf,
    catalog: PhaseCatalog,
    default_timeout: Duration,
    sync: Arc<dyn RequirementsSync>,
}

impl SuiteOrchestrator {
    pub fn new(
        scenarios_root: PathBuf,
        catalog: PhaseCatalog,
        default_timeout: Duration,
        sync: Arc<dyn RequirementsSync>,
    ) -> Self {
        let default_timeout = if default_timeout.is_zero() {
            catalog.default_timeout()
        } else {
            default_timeout
        };
        Self {
            scenarios_root,
            catalog,
            default_timeout,
            sync,
        }
    }

    /// Run a suite for the given request under the caller's cancellation
    /// token.
    #[instrument(skip(self, request, cancel), fields(scenario = %request.scenario_name))]
    pub async fn run(
        &self,
        request: &SuiteExecutionRequest,
        cancel: CancellationToken,
    ) -> DomainResult<SuiteExecutionResult> {
        if cancel.is_cancelled() {
            return Err(DomainError::system("suite canceled before start"));
        }

        let workspace = ScenarioWorkspace::resolve(&self.scenarios_root, &request.scenario_name)?;
        let config = ScenarioConfig::load(&workspace.scenario_dir)?;
        let builder = PlanBuilder::new(&self.catalog, self.default_timeout);
        let plan = builder.build(&workspace, &config, request)?;

        let artifact_dir = workspace.ensure_artifact_dir()?;
        let ctx = PhaseContext {
            scenario_name: workspace.scenario_name.clone(),
            scenario_dir: workspace.scenario_dir.clone(),
            test_dir: workspace.test_dir.clone(),
            phases_dir: workspace.phases_dir.clone(),
            app_root: workspace.app_root.clone(),
            artifact_dir,
            cancel: cancel.clone(),
        };

        info!(
            phases = ?plan.selected_names(),
            preset = %plan.preset_used,
            fail_fast = request.fail_fast,
            "suite starting"
        );

        let started_at = Utc::now();
        let executor = PhaseExecutor::new(self.default_timeout);
        let mut phases: Vec<PhaseResult> = Vec::with_capacity(plan.selected.len());
        for definition in &plan.selected {
            let result = executor.execute(definition, &ctx).await;
            let failed = !result.passed();
            phases.push(result);
            // Mid-run cancellation surfaces as a failed phase, so the
            // fail-fast flag decides whether the remaining phases are
            // skipped or recorded as canceled failures too.
            if failed && request.fail_fast {
                info!(phase = %definition.name, "fail-fast stop");
                break;
            }
        }
        let completed_at = Utc::now();

        let success = phases.len() == plan.selected.len() && phases.iter().all(PhaseResult::passed);
        let summary = summarize_phases(&phases);
        let result = SuiteExecutionResult {
            execution_id: None,
            suite_request_id: request.suite_request_id,
            scenario_name: workspace.scenario_name.clone(),
            preset_used: plan.preset_used.clone(),
            started_at,
            completed_at,
            success,
            phases,
            summary,
        };

        info!(
            success = result.success,
            passed = result.summary.passed,
            failed = result.summary.failed,
            "suite finished"
        );

        if sync_eligible(request, &plan, &result) {
            let payload = SyncRequest {
                scenario_name: workspace.scenario_name.clone(),
                scenario_dir: workspace.scenario_dir.clone(),
                definitions: plan.definitions.iter().map(|d| d.descriptor()).collect(),
                phase_results: result.phases.clone(),
                command_history: command_history(request, &result),
            };
            // Sync is best effort; its failures never fail the suite.
            if let Err(e) = self.sync.sync(&cancel, payload).await {
                warn!(error = %e, "requirements sync failed");
            }
        }

        Ok(result)
    }
}

/// Requirements sync only runs after a canonical full pass: nothing
/// narrowed the selection, every definition ran, and everything passed.
fn sync_eligible(
    request: &SuiteExecutionRequest,
    plan: &PhasePlan,
    result: &SuiteExecutionResult,
) -> bool {
    !plan.definitions.is_empty()
        && request.preset_name().is_none()
        && request.explicit_phases().is_empty()
        && request.skip_phases().is_empty()
        && plan.selected.len() == plan.definitions.len()
        && result.phases.len() == plan.selected.len()
        && result.success
}

/// Reconstructed invocation lines handed to the sync collaborator.
fn command_history(request: &SuiteExecutionRequest, result: &SuiteExecutionResult) -> Vec<String> {
    let mut line = format!("suite scenario={}", result.scenario_name);
    if let Some(preset) = request.preset_name() {
        line.push_str(&format!(" preset={preset}"));
    }
    let explicit = request.explicit_phases();
    if !explicit.is_empty() {
        line.push_str(&format!(" phases={}", explicit.join(",")));
    }
    let skip = request.skip_phases();
    if !skip.is_empty() {
        line.push_str(&format!(" skip={}", skip.join(",")));
    }
    if request.fail_fast {
        line.push_str(" failFast=true");
    }
    let order: Vec<&str> = result.phases.iter().map(|p| p.phase.as_str()).collect();
    vec![line, format!("phase-order:{}", order.join(","))]
}
