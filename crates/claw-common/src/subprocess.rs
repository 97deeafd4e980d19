//! Subprocess execution utilities.

use anyhow::{Context, Result};
use std::process::Output;
use std::thread;
use std::time::{Duration, Instant};

/// Default limit for externally configured commands.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable carrying the message text into external commands.
pub const MESSAGE_ENV: &str = "CLAW_MESSAGE";

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal)
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
}

impl CommandResult {
    /// Create from std::process::Output.
    pub fn from_output(output: &Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }

    /// Stdout on success, stderr otherwise, cut to `max` chars.
    pub fn summary(&self, max: usize) -> String {
        let text = if self.success { &self.stdout } else { &self.stderr };
        text.chars().take(max).collect()
    }
}

fn shell(cmd: &str) -> duct::Expression {
    if cfg!(target_os = "windows") {
        duct::cmd("cmd", ["/C", cmd])
    } else {
        duct::cmd("sh", ["-c", cmd])
    }
}

/// Run a shell command and return the result.
pub fn run_command(cmd: &str) -> Result<CommandResult> {
    run_command_with_input(cmd, None, DEFAULT_TIMEOUT)
}

/// Run a shell command with timeout.
///
/// When `message` is given it is fed on stdin and exported as `CLAW_MESSAGE`.
pub fn run_command_with_input(
    cmd: &str,
    message: Option<&str>,
    timeout: Duration,
) -> Result<CommandResult> {
    let mut expr = shell(cmd).stdout_capture().stderr_capture().unchecked();
    if let Some(message) = message {
        expr = expr
            .env(MESSAGE_ENV, message)
            .stdin_bytes(message.as_bytes().to_vec());
    } else {
        expr = expr.stdin_null();
    }

    tracing::debug!(command = cmd, "spawning external command");
    let handle = expr
        .start()
        .with_context(|| format!("Failed to spawn command: {}", cmd))?;

    let start = Instant::now();
    loop {
        match handle.try_wait() {
            Ok(Some(output)) => return Ok(CommandResult::from_output(output)),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = handle.kill();
                    anyhow::bail!("Command timed out after {:?}: {}", timeout, cmd);
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => return Err(e).context("Failed to wait for command"),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_success() {
        let result = run_command("echo hello").unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_command_failure() {
        let result = run_command("echo oops >&2; exit 3").unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.summary(10), "oops\n");
    }

    #[test]
    fn test_message_passed_via_env_and_stdin() {
        let result = run_command_with_input(
            "printf '%s|' \"$CLAW_MESSAGE\"; cat",
            Some("hi there"),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(result.stdout, "hi there|hi there");
    }

    #[test]
    fn test_timeout() {
        let err = run_command_with_input("exec sleep 5", None, Duration::from_millis(100)).unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
