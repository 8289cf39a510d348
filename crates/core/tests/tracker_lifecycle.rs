//! Job tracker integration tests: stop and resume against a real state file.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use sensorplan_core::{
    job::build_jobs,
    testing::{fixtures, MockExecutor},
    time_slots, Job, JobStatus, JobTracker, RetryConfig, RunControl, RunStateError,
    RunStateStore, SqliteRunStateStore, TrackerError,
};

fn ingestion_plan() -> Vec<Job> {
    let sensor = fixtures::sensor("mhs-n19", "2009-04-01", "2016-03-04");
    let window = fixtures::period("2009-04-01", "2009-05-05");
    let slots: Vec<_> = time_slots(&window, 7).collect();
    build_jobs(&slots, &[sensor.into()])
}

fn tracker(executor: Arc<MockExecutor>, store: Arc<SqliteRunStateStore>, control: RunControl) -> JobTracker {
    tracker_with_retry(executor, store, control, RetryConfig::default())
}

fn tracker_with_retry(
    executor: Arc<MockExecutor>,
    store: Arc<SqliteRunStateStore>,
    control: RunControl,
    retry: RetryConfig,
) -> JobTracker {
    JobTracker::new(
        executor,
        store,
        retry,
        fixtures::run_context("usecase-test"),
        control,
    )
}

#[tokio::test]
async fn test_stop_leaves_consistent_state_and_resume_finishes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = SqliteRunStateStore::path_for(temp_dir.path(), "usecase-test");
    let store = Arc::new(SqliteRunStateStore::new(&db_path).unwrap());
    let executor = Arc::new(MockExecutor::new());
    executor.set_duration(Duration::from_millis(50)).await;

    let jobs = ingestion_plan();
    assert_eq!(jobs.len(), 6);

    let control = RunControl::new();
    let stopper = {
        let control = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(75)).await;
            control.stop();
        })
    };

    let first = tracker(executor.clone(), store.clone(), control)
        .run(jobs.clone(), &fixtures::local_pool(1), temp_dir.path())
        .await
        .unwrap();
    stopper.await.unwrap();

    assert!(first.stopped);
    assert!(first.done() >= 1);
    assert!(first.pending() >= 1);
    assert_eq!(first.failed(), 0);
    assert!(!first.is_success(true));
    assert!(store
        .load()
        .unwrap()
        .values()
        .all(|r| r.status != JobStatus::Running));

    let done_first = first.done();
    let calls_first = executor.call_count().await;
    assert_eq!(calls_first, done_first);

    let second = tracker(executor.clone(), store.clone(), RunControl::new())
        .run(jobs, &fixtures::local_pool(2), temp_dir.path())
        .await
        .unwrap();

    assert!(!second.stopped);
    assert_eq!(second.resumed, done_first);
    assert_eq!(second.done(), 6);
    assert_eq!(executor.call_count().await, 6);
}

#[tokio::test]
async fn test_concurrency_never_exceeds_capacity() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(SqliteRunStateStore::in_memory().unwrap());
    let executor = Arc::new(MockExecutor::new());
    executor.set_duration(Duration::from_millis(20)).await;

    let pool = sensorplan_core::HostPool::new([
        sensorplan_core::HostEntry::new("node-1", 2),
        sensorplan_core::HostEntry::new("node-2", 1),
    ])
    .unwrap();

    let result = tracker(executor.clone(), store, RunControl::new())
        .run(ingestion_plan(), &pool, temp_dir.path())
        .await
        .unwrap();

    assert_eq!(result.done(), 6);
    assert!(executor.max_concurrency() <= 3);
    assert!(executor.max_concurrency() >= 2);
    assert_eq!(pool.available(), 3);
}

#[tokio::test]
async fn test_corrupt_state_aborts_before_any_job_runs() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = SqliteRunStateStore::path_for(temp_dir.path(), "usecase-test");
    let store = Arc::new(SqliteRunStateStore::new(&db_path).unwrap());
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute(
            "INSERT INTO job_states (job_id, status, attempts, updated_at) VALUES ('x', 'exploded', 1, 'yesterday')",
            [],
        )
        .unwrap();
    }
    let executor = Arc::new(MockExecutor::new());

    let result = tracker(executor.clone(), store, RunControl::new())
        .run(ingestion_plan(), &fixtures::local_pool(2), temp_dir.path())
        .await;

    assert!(matches!(
        result,
        Err(TrackerError::RunState(RunStateError::Corrupt { .. }))
    ));
    assert_eq!(executor.call_count().await, 0);
}

#[tokio::test]
async fn test_failed_jobs_rerun_with_fresh_attempt_budget() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = SqliteRunStateStore::path_for(temp_dir.path(), "usecase-test");
    let store = Arc::new(SqliteRunStateStore::new(&db_path).unwrap());
    let retry = RetryConfig::default().with_max_attempts(2);
    let jobs = ingestion_plan();
    let failing = jobs[2].id.clone();

    let executor = Arc::new(MockExecutor::new());
    executor.fail_times(&failing, 2).await;
    let first = tracker_with_retry(executor.clone(), store.clone(), RunControl::new(), retry.clone())
        .run(jobs.clone(), &fixtures::local_pool(2), temp_dir.path())
        .await
        .unwrap();

    assert_eq!(first.failed(), 1);
    assert_eq!(first.jobs[2].attempts, 2);
    let record = store.get(&failing).unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.attempts, 2);

    // Two more attempts are available: one failure is absorbed.
    executor.fail_times(&failing, 1).await;
    let second = tracker_with_retry(executor.clone(), store.clone(), RunControl::new(), retry)
        .run(jobs, &fixtures::local_pool(2), temp_dir.path())
        .await
        .unwrap();

    assert_eq!(second.resumed, 5);
    assert_eq!(second.done(), 6);
    assert_eq!(second.jobs[2].attempts, 2);
    assert_eq!(executor.calls_for(&failing).await, 4);
    assert_eq!(executor.call_count().await, 9);
    let record = store.get(&failing).unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Done);
    assert_eq!(record.attempts, 2);
}
