//! Directory layout of a workspace.

use camino::{Utf8Path, Utf8PathBuf};

/// Companion tools the installer places in `scripts/`.
pub const COMPANION_TOOLS: [&str; 2] = ["memory-system", "satisfaction-tracker"];

/// Paths of every artifact under a workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: Utf8PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn scripts_dir(&self) -> Utf8PathBuf {
        self.root.join("scripts")
    }

    pub fn memory_dir(&self) -> Utf8PathBuf {
        self.root.join("memory")
    }

    /// `memory/_experimental`, home of all machine-written state.
    pub fn experimental_dir(&self) -> Utf8PathBuf {
        self.memory_dir().join("_experimental")
    }

    pub fn shadow_dir(&self) -> Utf8PathBuf {
        self.experimental_dir().join("shadow")
    }

    pub fn raw_dir(&self) -> Utf8PathBuf {
        self.root.join("raw")
    }

    /// Directories the installer guarantees.
    pub fn install_dirs(&self) -> [Utf8PathBuf; 3] {
        [self.scripts_dir(), self.experimental_dir(), self.raw_dir()]
    }

    pub fn session_context_path(&self) -> Utf8PathBuf {
        self.experimental_dir().join("session-context.json")
    }

    pub fn system_state_path(&self) -> Utf8PathBuf {
        self.experimental_dir().join("system-state.json")
    }

    /// Conversation buffer maintained by the host at the workspace root.
    pub fn host_context_path(&self) -> Utf8PathBuf {
        self.root.join(".session-context.json")
    }

    pub fn tracker_path(&self) -> Utf8PathBuf {
        self.memory_dir().join("satisfaction-tracker.json")
    }

    pub fn insights_dir(&self) -> Utf8PathBuf {
        self.memory_dir().join("satisfaction-insights")
    }

    pub fn learning_path(&self) -> Utf8PathBuf {
        self.root.join("LEARNING.md")
    }
}
