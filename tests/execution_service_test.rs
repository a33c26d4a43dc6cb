mod helpers;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;
use test_genie::domain::models::{
    RequestedPhaseType, SuiteExecutionRequest, SuitePriority, SuiteRequest, SuiteRequestStatus,
};
use test_genie::domain::ports::{ExecutionRepository, NullRequirementsSync, SuiteRequestRepository};
use test_genie::infrastructure::database::{
    SqliteExecutionRepository, SqliteSuiteRequestRepository,
};
use test_genie::services::{
    default_catalog, ExecutionService, SuiteOrchestrator, DEFAULT_PHASE_TIMEOUT,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use helpers::database::{setup_test_db, teardown_test_db};

fn scaffold_scenario(root: &Path, name: &str) -> PathBuf {
    let scenarios_root = root.join("scenarios");
    fs::create_dir_all(scenarios_root.join(name).join("test").join("phases")).unwrap();
    scenarios_root
}

fn write_failing_unit_script(scenarios_root: &Path, scenario: &str) {
    use std::os::unix::fs::PermissionsExt;
    let path = scenarios_root
        .join(scenario)
        .join("test")
        .join("phases")
        .join("test-unit.sh");
    fs::write(&path, "#!/bin/bash\nexit 1\n").unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

fn queued_request(scenario: &str) -> SuiteRequest {
    SuiteRequest {
        id: Uuid::new_v4(),
        scenario_name: scenario.to_string(),
        requested_types: RequestedPhaseType::defaults(),
        coverage_target: 95,
        priority: SuitePriority::Normal,
        status: SuiteRequestStatus::Queued,
        estimated_queue_seconds: 30,
        created_at: Utc::now(),
    }
}

struct Fixture {
    service: ExecutionService,
    requests: Arc<SqliteSuiteRequestRepository>,
    executions: Arc<SqliteExecutionRepository>,
}

fn fixture(pool: &sqlx::SqlitePool, scenarios_root: PathBuf) -> Fixture {
    let requests = Arc::new(SqliteSuiteRequestRepository::new(pool.clone()));
    let executions = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    let orchestrator = Arc::new(SuiteOrchestrator::new(
        scenarios_root,
        default_catalog(DEFAULT_PHASE_TIMEOUT),
        DEFAULT_PHASE_TIMEOUT,
        Arc::new(NullRequirementsSync),
    ));
    let service = ExecutionService::new(orchestrator, requests.clone(), executions.clone());
    Fixture {
        service,
        requests,
        executions,
    }
}

#[tokio::test]
async fn test_direct_run_persists_execution() {
    let root = tempdir().unwrap();
    let scenarios_root = scaffold_scenario(root.path(), "demo");
    let pool = setup_test_db().await;
    let fx = fixture(&pool, scenarios_root);

    let request = SuiteExecutionRequest::for_scenario("demo");
    let result = fx
        .service
        .run(&request, CancellationToken::new())
        .await
        .unwrap();

    assert!(result.success);
    let id = result.execution_id.expect("execution id assigned");
    let stored = fx.executions.get(id).await.unwrap().expect("stored");
    assert_eq!(stored.scenario_name, "demo");
    assert_eq!(stored.phases.len(), result.phases.len());
    assert!(stored.suite_request_id.is_none());

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_queued_request_failure_lifecycle() {
    let root = tempdir().unwrap();
    let scenarios_root = scaffold_scenario(root.path(), "demo");
    write_failing_unit_script(&scenarios_root, "demo");
    let pool = setup_test_db().await;
    let fx = fixture(&pool, scenarios_root);

    let queued = queued_request("demo");
    fx.requests.insert(&queued).await.unwrap();

    let request = SuiteExecutionRequest::for_scenario("demo");
    let result = fx
        .service
        .execute_queued(queued.id, &request, CancellationToken::new())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.suite_request_id, Some(queued.id));

    // The request walked queued -> running -> failed.
    let loaded = fx.requests.get(queued.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuiteRequestStatus::Failed);

    // Exactly one execution record, linked to the request.
    let executions = fx.executions.list_recent("demo", 10, 0).await.unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].suite_request_id, Some(queued.id));
    assert!(!executions[0].success);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_queued_request_success_completes() {
    let root = tempdir().unwrap();
    let scenarios_root = scaffold_scenario(root.path(), "demo");
    let pool = setup_test_db().await;
    let fx = fixture(&pool, scenarios_root);

    let queued = queued_request("demo");
    fx.requests.insert(&queued).await.unwrap();

    let request = SuiteExecutionRequest::for_scenario("demo");
    let result = fx
        .service
        .execute_queued(queued.id, &request, CancellationToken::new())
        .await
        .unwrap();

    assert!(result.success);
    let loaded = fx.requests.get(queued.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuiteRequestStatus::Completed);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_scenario_match_ignores_case() {
    let root = tempdir().unwrap();
    let scenarios_root = scaffold_scenario(root.path(), "demo");
    let pool = setup_test_db().await;
    let fx = fixture(&pool, scenarios_root);

    // Queued under a different casing than the execution request.
    let queued = queued_request("Demo");
    fx.requests.insert(&queued).await.unwrap();

    let request = SuiteExecutionRequest::for_scenario("demo");
    let result = fx
        .service
        .execute_queued(queued.id, &request, CancellationToken::new())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.suite_request_id, Some(queued.id));
    let loaded = fx.requests.get(queued.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuiteRequestStatus::Completed);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_scenario_mismatch_rejected_without_side_effects() {
    let root = tempdir().unwrap();
    let scenarios_root = scaffold_scenario(root.path(), "demo");
    let pool = setup_test_db().await;
    let fx = fixture(&pool, scenarios_root);

    let queued = queued_request("other-scenario");
    fx.requests.insert(&queued).await.unwrap();

    let request = SuiteExecutionRequest::for_scenario("demo");
    let err = fx
        .service
        .execute_queued(queued.id, &request, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_validation(), "got {err}");
    assert!(err.to_string().contains("other-scenario"));

    // No transition happened and nothing was recorded.
    let loaded = fx.requests.get(queued.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuiteRequestStatus::Queued);
    assert!(fx.executions.latest().await.unwrap().is_none());

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let root = tempdir().unwrap();
    let scenarios_root = scaffold_scenario(root.path(), "demo");
    let pool = setup_test_db().await;
    let fx = fixture(&pool, scenarios_root);

    let request = SuiteExecutionRequest::for_scenario("demo");
    let err = fx
        .service
        .execute_queued(Uuid::new_v4(), &request, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {err}");

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_orchestrator_error_marks_request_failed() {
    let root = tempdir().unwrap();
    // Scenario directory exists in the queue but not on disk.
    let scenarios_root = root.path().join("scenarios");
    fs::create_dir_all(&scenarios_root).unwrap();
    let pool = setup_test_db().await;
    let fx = fixture(&pool, scenarios_root);

    let queued = queued_request("ghost");
    fx.requests.insert(&queued).await.unwrap();

    let request = SuiteExecutionRequest::for_scenario("ghost");
    let err = fx
        .service
        .execute_queued(queued.id, &request, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_validation(), "got {err}");

    let loaded = fx.requests.get(queued.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuiteRequestStatus::Failed);
    assert!(fx.executions.latest().await.unwrap().is_none());

    teardown_test_db(pool).await;
}
