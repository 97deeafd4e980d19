use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn hook() -> Command {
    let mut cmd = Command::cargo_bin("message-received").unwrap();
    cmd.env_remove("CLAW_ANALYZER_CMD").env_remove("CLAW_HOOK_DEBUG");
    cmd
}

#[test]
fn scores_message_and_updates_context() {
    let ws = tempdir().unwrap();
    let payload = serde_json::json!({
        "body": "good morning",
        "senderId": "42",
        "channel": "telegram",
        "chatType": "direct",
        "messageId": "m-1",
        "wasMentioned": false,
        "workspaceDir": ws.path().to_str().unwrap(),
    });

    hook()
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hookEventName\":\"message:received\""))
        .stdout(predicate::str::contains("[💤 2.0 ctx:1⟳]"));

    let context: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(ws.path().join("memory/_experimental/session-context.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(context["sessionContextCount"], 1);
    assert_eq!(context["lastMessage"]["emoji"], "💤");
    assert!(context["lastMessage"]["timestamp"].as_i64().unwrap() > 0);

    let raw: Vec<_> = fs::read_dir(ws.path().join("raw")).unwrap().collect();
    assert_eq!(raw.len(), 1);
    let line = fs::read_to_string(raw[0].as_ref().unwrap().path()).unwrap();
    assert!(line.contains("\"body\":\"good morning\""));
    assert!(line.contains("\"channel\":\"telegram\""));
}

#[cfg(unix)]
#[test]
fn uses_configured_analyzer() {
    let ws = tempdir().unwrap();
    let payload = serde_json::json!({
        "body": "I quit my job",
        "workspaceDir": ws.path().to_str().unwrap(),
    });

    hook()
        .env("CLAW_ANALYZER_CMD", r#"echo '{"combined": 9.1, "surprise": "high"}'"#)
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("[🔥 9.1! ctx:1⟳]"))
        .stdout(predicate::str::contains("IMPORTANT"));
}

#[test]
fn empty_body_is_ignored() {
    let ws = tempdir().unwrap();
    let payload = serde_json::json!({ "body": "", "workspaceDir": ws.path().to_str().unwrap() });

    hook()
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout("");
    assert!(!ws.path().join("raw").exists());
}

#[test]
fn debug_env_writes_decision_log() {
    let ws = tempdir().unwrap();
    let payload = serde_json::json!({ "body": "hi", "workspaceDir": ws.path().to_str().unwrap() });

    hook()
        .env("CLAW_HOOK_DEBUG", "1")
        .write_stdin(payload.to_string())
        .assert()
        .success();

    let log = fs::read_to_string(ws.path().join("memory/_experimental/logs/hook-debug.jsonl")).unwrap();
    assert!(log.contains("\"decision\":\"scored\""));
}

#[test]
fn unwritable_debug_log_warns_and_still_scores() {
    let ws = tempdir().unwrap();
    let experimental = ws.path().join("memory/_experimental");
    fs::create_dir_all(&experimental).unwrap();
    fs::write(experimental.join("logs"), "not a directory").unwrap();
    let payload = serde_json::json!({ "body": "hi", "workspaceDir": ws.path().to_str().unwrap() });

    hook()
        .env("CLAW_HOOK_DEBUG", "1")
        .env_remove("RUST_LOG")
        .write_stdin(payload.to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("[💤 2.0 ctx:1⟳]"))
        .stderr(predicate::str::contains("failed to write hook debug log"));
}
