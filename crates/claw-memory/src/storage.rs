//! Markdown memory files and JSONL raw logs.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, NaiveDate, Utc};
use claw_common::MessageReceived;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use walkdir::WalkDir;

/// Longest body kept in a raw log line.
pub const RAW_BODY_LIMIT: usize = 2000;

const EXPERIMENTAL: &str = "_experimental";

/// Markdown memory rooted at `<workspace>/memory`.
#[derive(Debug, Clone)]
pub struct MarkdownStore {
    root: Utf8PathBuf,
}

/// Memory file matching a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Path relative to the store root
    pub file: Utf8PathBuf,
    /// 1-based line numbers and text of matching lines
    pub lines: Vec<(usize, String)>,
}

impl MarkdownStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Append `content` to `relative`, under a `## title` heading if given.
    pub fn append(&self, relative: &Utf8Path, content: &str, title: Option<&str>) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open memory file: {}", path))?;

        if let Some(title) = title {
            writeln!(file, "\n## {}\n", title)?;
        }
        writeln!(file, "{}", content.trim_end())?;
        Ok(path)
    }

    /// Markdown files outside `_experimental`.
    pub fn memory_files(&self) -> Vec<Utf8PathBuf> {
        markdown_files(&self.root)
            .into_iter()
            .filter(|p| !p.components().any(|c| c.as_str() == EXPERIMENTAL))
            .collect()
    }

    /// Case-insensitive substring search, best files first.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query_lower = query.to_lowercase();
        let mut hits = Vec::new();

        for path in self.memory_files() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read memory file: {}", path))?;
            let lines: Vec<(usize, String)> = content
                .lines()
                .enumerate()
                .filter(|(_, line)| line.to_lowercase().contains(&query_lower))
                .map(|(i, line)| (i + 1, line.trim().to_string()))
                .collect();

            if !lines.is_empty() {
                let file = path
                    .strip_prefix(&self.root)
                    .map(Utf8Path::to_path_buf)
                    .unwrap_or(path.clone());
                hits.push(SearchHit { file, lines });
            }
        }

        hits.sort_by(|a, b| b.lines.len().cmp(&a.lines.len()).then(a.file.cmp(&b.file)));
        hits.truncate(limit);
        Ok(hits)
    }
}

/// All `*.md` files below `dir`, empty if it does not exist.
pub fn markdown_files(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }

    let mut files: Vec<Utf8PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.into_path()).ok())
        .filter(|path| path.extension() == Some("md"))
        .collect();
    files.sort();
    files
}

/// One line of `raw/<date>.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default)]
    pub was_mentioned: bool,
    pub body: String,
}

impl RawEntry {
    pub fn from_message(message: &MessageReceived, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            sender_id: message.sender_id.clone(),
            channel: message.channel.clone(),
            chat_type: message.chat_type.clone(),
            message_id: message.message_id.clone(),
            reply_to_id: message.reply_to_id.clone(),
            was_mentioned: message.was_mentioned,
            body: truncate_chars(message.text(), RAW_BODY_LIMIT),
        }
    }
}

/// Daily JSONL logs under `<workspace>/raw`.
#[derive(Debug, Clone)]
pub struct RawLog {
    dir: Utf8PathBuf,
}

impl RawLog {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn day_path(&self, day: NaiveDate) -> Utf8PathBuf {
        self.dir.join(format!("{}.jsonl", day.format("%Y-%m-%d")))
    }

    /// Append an entry to the log of its day.
    pub fn append(&self, entry: &RawEntry) -> Result<Utf8PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir))?;

        let path = self.day_path(entry.timestamp.date_naive());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open raw log: {}", path))?;

        let line = serde_json::to_string(entry)?;
        writeln!(file, "{}", line)?;
        Ok(path)
    }

    /// Load all entries of a day, skipping unparseable lines.
    #[cfg(test)]
    pub(crate) fn load_day(&self, day: NaiveDate) -> Result<Vec<RawEntry>> {
        use std::io::{BufRead, BufReader};

        let path = self.day_path(day);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file =
            fs::File::open(&path).with_context(|| format!("Failed to open raw log: {}", path))?;

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RawEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(error = %e, file = %path, "skipping malformed raw log line"),
            }
        }

        Ok(entries)
    }
}

/// First `max` chars of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_append_with_title() {
        let dir = tempdir().unwrap();
        let store = MarkdownStore::new(utf8(&dir));

        let path = store
            .append(Utf8Path::new("people/alice.md"), "Likes tea.", Some("Alice"))
            .unwrap();
        store.append(Utf8Path::new("people/alice.md"), "Hates coffee.\n", None).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "\n## Alice\n\nLikes tea.\nHates coffee.\n");
    }

    #[test]
    fn test_search_ranks_and_skips_experimental() {
        let dir = tempdir().unwrap();
        let root = utf8(&dir);
        let store = MarkdownStore::new(root.clone());

        store.append(Utf8Path::new("a.md"), "Rust is fun", None).unwrap();
        store
            .append(Utf8Path::new("b.md"), "rust once\nand RUST twice", None)
            .unwrap();
        store
            .append(Utf8Path::new("_experimental/shadow/c.md"), "rust hidden", None)
            .unwrap();

        let hits = store.search("rust", 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].file, Utf8PathBuf::from("b.md"));
        assert_eq!(hits[0].lines, vec![(1, "rust once".to_string()), (2, "and RUST twice".to_string())]);
        assert_eq!(hits[1].file, Utf8PathBuf::from("a.md"));

        assert_eq!(store.memory_files().len(), 2);
        assert_eq!(markdown_files(&root).len(), 3);
    }

    #[test]
    fn test_raw_log_append_and_load() {
        let dir = tempdir().unwrap();
        let log = RawLog::new(utf8(&dir).join("raw"));
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

        let message = MessageReceived {
            body: Some("x".repeat(RAW_BODY_LIMIT + 10)),
            sender_id: Some("7".to_string()),
            ..MessageReceived::default()
        };
        let path = log.append(&RawEntry::from_message(&message, ts)).unwrap();
        assert!(path.as_str().ends_with("raw/2026-03-01.jsonl"));

        fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"not json\n")
            .unwrap();

        let entries = log.load_day(ts.date_naive()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body.len(), RAW_BODY_LIMIT);
        assert_eq!(entries[0].sender_id.as_deref(), Some("7"));
    }
}
