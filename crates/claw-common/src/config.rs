//! Environment configuration shared by every tool.

use camino::Utf8PathBuf;
use std::env;

/// Workspace root override.
pub const WORKSPACE_ENV: &str = "CLAW_WORKSPACE";
/// Command printing the arousal analysis of `$CLAW_MESSAGE` as JSON.
pub const ANALYZER_ENV: &str = "CLAW_ANALYZER_CMD";
/// Command syncing recent session context at boot.
pub const SYNC_ENV: &str = "CLAW_SYNC_CMD";
/// Command printing forgetting recommendations.
pub const FORGET_ENV: &str = "CLAW_FORGET_CMD";
/// Command running the nightly consolidation.
pub const CONSOLIDATE_ENV: &str = "CLAW_CONSOLIDATE_CMD";

/// Resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClawConfig {
    /// Workspace root
    pub workspace: Utf8PathBuf,
    /// External analyzer command
    pub analyzer_cmd: Option<String>,
    /// External context sync command
    pub sync_cmd: Option<String>,
    /// External forgetting scan command
    pub forget_cmd: Option<String>,
    /// External consolidation command
    pub consolidate_cmd: Option<String>,
}

impl ClawConfig {
    /// Load configuration from the environment.
    ///
    /// `workspace` takes priority over `CLAW_WORKSPACE`, which takes priority
    /// over `~/clawd`.
    pub fn from_env(workspace: Option<Utf8PathBuf>) -> Self {
        Self {
            workspace: workspace.unwrap_or_else(default_workspace),
            analyzer_cmd: non_empty_var(ANALYZER_ENV),
            sync_cmd: non_empty_var(SYNC_ENV),
            forget_cmd: non_empty_var(FORGET_ENV),
            consolidate_cmd: non_empty_var(CONSOLIDATE_ENV),
        }
    }

    /// Same configuration pointed at another workspace.
    pub fn with_workspace(mut self, workspace: impl Into<Utf8PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }
}

/// Default workspace root.
///
/// Priority:
/// 1. CLAW_WORKSPACE environment variable (if set)
/// 2. ~/clawd
pub fn default_workspace() -> Utf8PathBuf {
    if let Some(custom) = non_empty_var(WORKSPACE_ENV) {
        return Utf8PathBuf::from(custom);
    }

    dirs::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .map(|home| home.join("clawd"))
        .unwrap_or_else(|| Utf8PathBuf::from("clawd"))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
