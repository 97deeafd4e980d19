use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn tracker(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("satisfaction-tracker").unwrap();
    cmd.arg("--workspace").arg(workspace);
    cmd
}

#[test]
fn record_then_analyze() {
    let ws = tempdir().unwrap();

    tracker(ws.path())
        .args(["record", "negative", "deploy", "you forgot the migration", "sorry"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Recorded incident: "));

    let output = tracker(ws.path()).args(["analyze", "7"]).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total_incidents"], 1);
    assert_eq!(report["concern_ratio"].as_f64(), Some(1.0));
    assert_eq!(report["signal_breakdown"]["negative"], 1);
    assert_eq!(report["recent_incidents"][0]["analysis"], "Pending analysis");
}

#[test]
fn unknown_signal_is_rejected() {
    let ws = tempdir().unwrap();
    tracker(ws.path())
        .args(["record", "grumpy", "ctx", "u", "r"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown signal"));
}

#[test]
fn missing_record_arguments_fail() {
    let ws = tempdir().unwrap();
    tracker(ws.path()).args(["record", "positive"]).assert().failure();
}

#[test]
fn analyze_without_incidents() {
    let ws = tempdir().unwrap();
    tracker(ws.path())
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("No incidents in the specified period"));
}

#[test]
fn daily_summary_and_learning() {
    let ws = tempdir().unwrap();

    tracker(ws.path())
        .arg("daily-summary")
        .assert()
        .success()
        .stdout("No satisfaction incidents recorded today.\n");

    tracker(ws.path())
        .args(["record", "positive", "short answers", "perfect", "thanks", "kept it brief"])
        .assert()
        .success();

    tracker(ws.path())
        .arg("daily-summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily summary saved:"));
    let insights = fs::read_dir(ws.path().join("memory/satisfaction-insights")).unwrap().count();
    assert_eq!(insights, 1);

    tracker(ws.path()).arg("update-learning").assert().success();
    let learning = fs::read_to_string(ws.path().join("LEARNING.md")).unwrap();
    assert!(learning.contains("✅ **Keep Doing:** short answers"));
}

#[test]
fn detect_prints_signal() {
    let ws = tempdir().unwrap();
    tracker(ws.path())
        .args(["detect", "Tell me more about that"])
        .assert()
        .success()
        .stdout("interested\n");
    tracker(ws.path()).args(["detect", "ok"]).assert().success().stdout("none\n");
}
