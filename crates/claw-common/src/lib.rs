//! Common utilities for the clawd memory tools and hooks.
//!
//! This crate provides shared functionality for every binary in the workspace:
//! - Host hook payload parsing and hook output
//! - Subprocess execution for externally configured commands
//! - JSON state file management
//! - Environment configuration
//! - Debug logging

pub mod config;
pub mod debug;
pub mod input;
pub mod logging;
pub mod output;
pub mod state;
pub mod subprocess;

pub use config::ClawConfig;
pub use debug::{HookDebugLog, is_debug_enabled, log_decision};
pub use input::MessageReceived;
pub use output::HookOutput;
pub use state::StateManager;
pub use subprocess::{CommandResult, run_command};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ClawConfig;
    pub use crate::debug::{HookDebugLog, is_debug_enabled, log_decision};
    pub use crate::input::MessageReceived;
    pub use crate::output::HookOutput;
    pub use crate::state::StateManager;
    pub use crate::subprocess::{CommandResult, run_command};
    pub use anyhow::{Context, Result};
    pub use camino::{Utf8Path, Utf8PathBuf};
    pub use serde::{Deserialize, Serialize};
}
