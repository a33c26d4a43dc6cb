mod helpers;

use chrono::{Duration, Utc};
use test_genie::domain::models::execution::SuiteExecutionRecord;
use test_genie::domain::models::phase::{FailureClass, PhaseResult, PhaseStatus};
use test_genie::domain::ports::ExecutionRepository;
use test_genie::infrastructure::database::SqliteExecutionRepository;
use uuid::Uuid;

use helpers::database::{setup_test_db, teardown_test_db};

fn phase_result(phase: &str, status: PhaseStatus) -> PhaseResult {
    PhaseResult {
        phase: phase.to_string(),
        status,
        duration_seconds: 4,
        log_path: format!("scenarios/demo/test/artifacts/{phase}.log"),
        error: if status == PhaseStatus::Failed {
            "script exited with status 1".to_string()
        } else {
            String::new()
        },
        classification: if status == PhaseStatus::Failed {
            Some(FailureClass::System)
        } else {
            None
        },
        remediation: String::new(),
        observations: vec![format!("{phase} checked")],
    }
}

fn record_for(scenario: &str, minutes_ago: i64, success: bool) -> SuiteExecutionRecord {
    let completed_at = Utc::now() - Duration::minutes(minutes_ago);
    SuiteExecutionRecord {
        id: Uuid::new_v4(),
        suite_request_id: None,
        scenario_name: scenario.to_string(),
        preset_used: String::new(),
        started_at: completed_at - Duration::minutes(2),
        completed_at,
        success,
        phases: vec![
            phase_result("structure", PhaseStatus::Passed),
            phase_result(
                "unit",
                if success {
                    PhaseStatus::Passed
                } else {
                    PhaseStatus::Failed
                },
            ),
        ],
    }
}

#[tokio::test]
async fn test_insert_and_get_round_trip() {
    let pool = setup_test_db().await;
    let repo = SqliteExecutionRepository::new(pool.clone());

    let mut record = record_for("demo", 0, false);
    record.suite_request_id = Some(Uuid::new_v4());
    record.preset_used = "quick".to_string();
    repo.insert(&record).await.unwrap();

    let loaded = repo.get(record.id).await.unwrap().expect("should exist");
    assert_eq!(loaded, record);

    // The result view recomputes the summary from stored phases.
    let result = loaded.into_result();
    assert_eq!(result.summary.total, 2);
    assert_eq!(result.summary.passed, 1);
    assert_eq!(result.summary.failed, 1);
    assert_eq!(result.summary.observations, 2);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let pool = setup_test_db().await;
    let repo = SqliteExecutionRepository::new(pool.clone());

    assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_list_recent_filters_scenario_and_orders() {
    let pool = setup_test_db().await;
    let repo = SqliteExecutionRepository::new(pool.clone());

    repo.insert(&record_for("demo", 30, true)).await.unwrap();
    repo.insert(&record_for("demo", 10, false)).await.unwrap();
    repo.insert(&record_for("other", 1, true)).await.unwrap();

    let listed = repo.list_recent("demo", 10, 0).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(!listed[0].success, "newest demo run first");
    assert!(listed[1].success);

    let offset = repo.list_recent("demo", 10, 1).await.unwrap();
    assert_eq!(offset.len(), 1);
    assert!(offset[0].success);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_list_recent_clamps_limit_and_offset() {
    let pool = setup_test_db().await;
    let repo = SqliteExecutionRepository::new(pool.clone());

    for minutes in 0..3 {
        repo.insert(&record_for("demo", minutes, true)).await.unwrap();
    }

    // Zero and negative limits read one row; negative offset reads from
    // the start.
    assert_eq!(repo.list_recent("demo", 0, 0).await.unwrap().len(), 1);
    assert_eq!(repo.list_recent("demo", -5, 0).await.unwrap().len(), 1);
    assert_eq!(repo.list_recent("demo", 10, -3).await.unwrap().len(), 3);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_latest_across_scenarios() {
    let pool = setup_test_db().await;
    let repo = SqliteExecutionRepository::new(pool.clone());

    assert!(repo.latest().await.unwrap().is_none());

    repo.insert(&record_for("demo", 20, true)).await.unwrap();
    let newest = record_for("other", 1, false);
    repo.insert(&newest).await.unwrap();

    let latest = repo.latest().await.unwrap().expect("should exist");
    assert_eq!(latest.id, newest.id);
    assert_eq!(latest.scenario_name, "other");

    teardown_test_db(pool).await;
}
