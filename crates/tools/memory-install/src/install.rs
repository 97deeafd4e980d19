//! Workspace initialization steps.
//!
//! Every precondition is checked before the first write, so a failing check
//! leaves the filesystem untouched. After that the steps run in order and the
//! first error aborts; nothing is rolled back.

use camino::{Utf8Path, Utf8PathBuf};
use claw_memory::SessionContext;
use claw_memory::layout::{COMPANION_TOOLS, WorkspaceLayout};
use std::fs;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("parent directory of workspace does not exist: {0}")]
    MissingParent(Utf8PathBuf),

    #[error("workspace path exists but is not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    #[error("companion tool not found: {0}")]
    MissingSource(Utf8PathBuf),

    #[error("companion tool source is its own install target: {0}")]
    SourceIsTarget(Utf8PathBuf),

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize session context: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_err(action: &'static str, path: &Utf8Path) -> impl FnOnce(io::Error) -> InstallError {
    let path = path.to_path_buf();
    move |source| InstallError::Io {
        action,
        path,
        source,
    }
}

/// Whether the session context was written or left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextWrite {
    Written,
    Kept,
}

pub struct Installer {
    layout: WorkspaceLayout,
    source_dir: Utf8PathBuf,
    keep_context: bool,
}

impl Installer {
    pub fn new(workspace: impl Into<Utf8PathBuf>, source_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            layout: WorkspaceLayout::new(workspace),
            source_dir: source_dir.into(),
            keep_context: false,
        }
    }

    /// Leave an existing session-context file in place.
    pub fn keep_context(mut self, keep: bool) -> Self {
        self.keep_context = keep;
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Source path of each companion tool, with the platform executable suffix.
    pub fn tool_sources(&self) -> Vec<(Utf8PathBuf, Utf8PathBuf)> {
        COMPANION_TOOLS
            .iter()
            .map(|name| {
                let file = format!("{}{}", name, std::env::consts::EXE_SUFFIX);
                (self.source_dir.join(&file), self.layout.scripts_dir().join(&file))
            })
            .collect()
    }

    /// Validate everything that can be validated without writing.
    pub fn check(&self) -> Result<(), InstallError> {
        for (source, target) in self.tool_sources() {
            if !source.is_file() {
                return Err(InstallError::MissingSource(source));
            }
            if same_file(&source, &target) {
                return Err(InstallError::SourceIsTarget(source));
            }
        }

        let root = self.layout.root();
        if root.exists() {
            if !root.is_dir() {
                return Err(InstallError::NotADirectory(root.to_path_buf()));
            }
            return Ok(());
        }

        let parent = match root.parent() {
            Some(p) if !p.as_str().is_empty() => p,
            _ => Utf8Path::new("."),
        };
        if !parent.is_dir() {
            return Err(InstallError::MissingParent(parent.to_path_buf()));
        }
        Ok(())
    }

    /// Create the workspace root (one level only) and the fixed layout.
    pub fn create_dirs(&self) -> Result<Vec<Utf8PathBuf>, InstallError> {
        let root = self.layout.root();
        if !root.exists() {
            fs::create_dir(root).map_err(io_err("create", root))?;
        }

        let dirs = self.layout.install_dirs();
        for dir in &dirs {
            fs::create_dir_all(dir).map_err(io_err("create", dir))?;
        }
        Ok(dirs.to_vec())
    }

    /// Copy the companion tools into `scripts/` and mark them executable.
    pub fn copy_tools(&self) -> Result<Vec<Utf8PathBuf>, InstallError> {
        let mut installed = Vec::new();
        for (source, target) in self.tool_sources() {
            fs::copy(&source, &target).map_err(io_err("copy to", &target))?;
            make_executable(&target)?;
            installed.push(target);
        }
        Ok(installed)
    }

    /// Write the session-context template.
    pub fn write_context(&self) -> Result<ContextWrite, InstallError> {
        let path = self.layout.session_context_path();
        if self.keep_context && path.exists() {
            return Ok(ContextWrite::Kept);
        }

        let content = serde_json::to_string_pretty(&SessionContext::default())?;
        fs::write(&path, content + "\n").map_err(io_err("write", &path))?;
        Ok(ContextWrite::Written)
    }
}

/// Whether both paths resolve to the same existing file.
fn same_file(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (a.canonicalize_utf8(), b.canonicalize_utf8()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(io_err("chmod", path))
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> Result<(), InstallError> {
    Ok(())
}
