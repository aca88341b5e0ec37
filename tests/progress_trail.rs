//! Progress persistence integration tests.
//!
//! Runs the orchestrator against a real JSONL log on disk and verifies the
//! replayed trail an external observer would see.

mod common;

use std::sync::Arc;

use common::ScriptedExecutor;
use provis::core::{MilestoneRegistry, Orchestrator, Plan, ProgressLog, RunSpec};
use provis::domain::{Direction, EventStatus, HostRef, Identity, PackageCategory};
use tempfile::TempDir;

fn spec() -> RunSpec {
    RunSpec::new(
        HostRef::new("db1"),
        PackageCategory::Database,
        Direction::Install,
        Identity::new("root"),
    )
}

#[tokio::test]
async fn successful_run_replays_as_ordered_success_trail() {
    let temp = TempDir::new().unwrap();
    let log = Arc::new(ProgressLog::at(temp.path().to_path_buf()));
    let executor = Arc::new(ScriptedExecutor::new());
    let orchestrator = Orchestrator::new(executor, log.clone());

    let registry = MilestoneRegistry::from_pairs(&[
        ("prepare", "Preparing system"),
        ("install", "Installing packages"),
        ("finish", "Finishing up"),
    ]);
    let plan = Plan::new()
        .marker("prepare")
        .command("apt-get update -y")
        .marker("install")
        .command("apt-get install -y mysql-server")
        .marker("finish")
        .command("systemctl restart mysql");

    let spec = spec();
    orchestrator.run(plan, &registry, &spec).await.unwrap();

    let trail = log.replay().await.unwrap();
    assert_eq!(trail.len(), 3);

    let indices: Vec<u32> = trail.iter().map(|e| e.step_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    for event in &trail {
        assert_eq!(event.status, EventStatus::Success);
        assert_eq!(event.total_steps, 3);
        assert_eq!(event.run_id, spec.run_id);
        assert_eq!(event.host, "db1");
    }

    assert_eq!(trail[1].milestone_label, "Installing packages");
}

#[tokio::test]
async fn failed_run_trail_shows_failure_point() {
    let temp = TempDir::new().unwrap();
    let log = Arc::new(ProgressLog::at(temp.path().to_path_buf()));
    let executor =
        Arc::new(ScriptedExecutor::new().fail_on("apt-get install -y mysql-server", 100, "held packages"));
    let orchestrator = Orchestrator::new(executor, log.clone());

    let registry = MilestoneRegistry::from_pairs(&[
        ("prepare", "Preparing system"),
        ("install", "Installing packages"),
        ("finish", "Finishing up"),
    ]);
    let plan = Plan::new()
        .marker("prepare")
        .command("apt-get update -y")
        .marker("install")
        .command("apt-get install -y mysql-server")
        .marker("finish");

    orchestrator.run(plan, &registry, &spec()).await.unwrap_err();

    let trail = log.replay().await.unwrap();
    assert_eq!(trail.len(), 2);

    assert_eq!(trail[0].milestone_key, "prepare");
    assert_eq!(trail[0].status, EventStatus::Success);

    assert_eq!(trail[1].milestone_key, "install");
    assert_eq!(trail[1].status, EventStatus::Failed);
    let error = trail[1].error.as_deref().unwrap();
    assert!(error.contains("apt-get install -y mysql-server"));
    assert!(error.contains("held packages"));

    // Nothing pending once the run terminated
    assert!(trail.iter().all(|e| e.status != EventStatus::Pending));
}

#[tokio::test]
async fn snapshot_log_keeps_full_history() {
    let temp = TempDir::new().unwrap();
    let log = Arc::new(ProgressLog::at(temp.path().to_path_buf()));
    let executor = Arc::new(ScriptedExecutor::new());
    let orchestrator = Orchestrator::new(executor, log.clone());

    let registry = MilestoneRegistry::from_pairs(&[("only", "Only milestone")]);
    let plan = Plan::new().marker("only").command("true");

    orchestrator.run(plan, &registry, &spec()).await.unwrap();

    // Raw log: pending snapshot then success snapshot for the same event
    let raw = log.raw_snapshots().await.unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0].status, EventStatus::Pending);
    assert_eq!(raw[1].status, EventStatus::Success);
    assert_eq!(raw[0].id, raw[1].id);
    assert!(raw[1].updated_at >= raw[0].updated_at);
}
