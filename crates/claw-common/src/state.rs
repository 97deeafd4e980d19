//! State file management for the memory tools.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Serialize, de::DeserializeOwned};
use std::fs;

/// Manager for pretty-printed JSON state files kept in one directory.
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Base directory for state files
    base_dir: Utf8PathBuf,
}

impl StateManager {
    /// Create a new state manager rooted at `base_dir`.
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory holding the state files.
    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Get the path for a state file with the given key.
    pub fn state_path(&self, key: &str) -> Utf8PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }

    /// Load state from file.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.state_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read state file: {}", path))?;

        let state: T = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path))?;

        Ok(Some(state))
    }

    /// Save state to file, creating the base directory if needed.
    pub fn save<T: Serialize>(&self, key: &str, state: &T) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create directory: {}", self.base_dir))?;
        let path = self.state_path(key);
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write state file: {}", path))?;
        Ok(())
    }

    /// Load state, or fall back to the default when the file is missing.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key)?.unwrap_or_default())
    }
}
