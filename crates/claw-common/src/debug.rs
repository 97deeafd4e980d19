//! Debug logging for hooks.
//!
//! Logs hook decisions to a JSONL file inside the workspace.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;

/// Enables the debug log when set.
pub const DEBUG_ENV: &str = "CLAW_HOOK_DEBUG";

const SUMMARY_LIMIT: usize = 200;

/// Debug log entry for hook execution
#[derive(Debug, Serialize)]
pub struct HookDebugLog {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Hook name (e.g., "message-received")
    pub hook_name: String,
    /// Host event
    pub event: String,
    /// Input summary (truncated for large inputs)
    pub input_summary: String,
    /// Decision made (scored/skip/error)
    pub decision: String,
    /// Reason for the decision
    pub reason: String,
    /// Additional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl HookDebugLog {
    pub fn new(hook_name: &str, event: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            hook_name: hook_name.to_string(),
            event: event.to_string(),
            input_summary: String::new(),
            decision: String::new(),
            reason: String::new(),
            context: None,
        }
    }

    pub fn with_input(mut self, summary: &str) -> Self {
        self.input_summary = if summary.chars().count() > SUMMARY_LIMIT {
            let head: String = summary.chars().take(SUMMARY_LIMIT).collect();
            format!("{}...", head)
        } else {
            summary.to_string()
        };
        self
    }

    pub fn with_decision(mut self, decision: &str, reason: &str) -> Self {
        self.decision = decision.to_string();
        self.reason = reason.to_string();
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    /// Append the entry to the workspace debug log if debugging is enabled.
    pub fn write(&self, workspace: &Utf8Path) -> std::io::Result<()> {
        if !is_debug_enabled(workspace) {
            return Ok(());
        }

        let log_path = debug_log_path(workspace);
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let json = serde_json::to_string(self).unwrap_or_default();
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

/// Check if debug mode is enabled
pub fn is_debug_enabled(workspace: &Utf8Path) -> bool {
    if std::env::var(DEBUG_ENV).is_ok() {
        return true;
    }

    workspace
        .join("memory")
        .join("_experimental")
        .join(".hook-debug")
        .exists()
}

/// Get debug log file path
pub fn debug_log_path(workspace: &Utf8Path) -> Utf8PathBuf {
    workspace
        .join("memory")
        .join("_experimental")
        .join("logs")
        .join("hook-debug.jsonl")
}

/// Quick helper to log a hook decision
pub fn log_decision(workspace: &Utf8Path, hook_name: &str, input: &str, decision: &str, reason: &str) {
    let log = HookDebugLog::new(hook_name, "message:received")
        .with_input(input)
        .with_decision(decision, reason);

    if let Err(e) = log.write(workspace) {
        tracing::warn!(error = %e, "failed to write hook debug log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_debug_log_serialization() {
        let log = HookDebugLog::new("message-received", "message:received")
            .with_input("hello")
            .with_decision("scored", "combined 7.2")
            .with_context("ctx:3");

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("message-received"));
        assert!(json.contains("\"decision\":\"scored\""));
        assert!(json.contains("ctx:3"));
    }

    #[test]
    fn test_truncation() {
        let long_input = "あ".repeat(500);
        let log = HookDebugLog::new("test", "message:received").with_input(&long_input);

        assert_eq!(log.input_summary.chars().count(), 203); // 200 + "..."
    }

    #[test]
    fn test_marker_enables_log() {
        let dir = tempdir().unwrap();
        let ws = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let marker_dir = ws.join("memory").join("_experimental");
        std::fs::create_dir_all(&marker_dir).unwrap();
        std::fs::write(marker_dir.join(".hook-debug"), "").unwrap();

        HookDebugLog::new("test", "message:received")
            .with_decision("skip", "empty body")
            .write(&ws)
            .unwrap();

        let content = std::fs::read_to_string(debug_log_path(&ws)).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("empty body"));
    }
}
