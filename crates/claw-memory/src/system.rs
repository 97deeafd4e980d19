//! The memory-system pipeline: boot, process, save, search, status, daily.

use crate::error::MemoryError;
use crate::layout::WorkspaceLayout;
use crate::schema::{Analysis, HighScore, SessionContext, SystemState};
use crate::scoring::{self, AUTO_SAVE_THRESHOLD, HIGHLIGHT_THRESHOLD, ScoreBand};
use crate::storage::{MarkdownStore, RawEntry, RawLog, SearchHit, markdown_files, truncate_chars};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use claw_common::subprocess::{DEFAULT_TIMEOUT, run_command_with_input};
use claw_common::{ClawConfig, CommandResult, MessageReceived, StateManager, run_command};
use serde::Serialize;
use std::fs;

const SYSTEM_STATE_KEY: &str = "system-state";
const SESSION_CONTEXT_KEY: &str = "session-context";

const PREVIEW_LIMIT: usize = 100;
const SEARCH_LIMIT: usize = 5;

/// Outcome of one pipeline step run by `boot` or `daily`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionReport {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<usize>,
}

impl ActionReport {
    fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            success: None,
            output: None,
            candidates: None,
        }
    }

    fn not_configured(action: &str) -> Self {
        let mut report = Self::new(action);
        report.output = Some("not configured".to_string());
        report
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    pub timestamp: DateTime<Utc>,
    pub actions: Vec<ActionReport>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub actions: Vec<ActionReport>,
}

/// Result of processing one message.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub timestamp: DateTime<Utc>,
    pub message_preview: String,
    pub score: f64,
    pub analysis: Analysis,
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    pub debug: String,
    pub emoji: String,
    pub context_count: u64,
    pub flags: Vec<String>,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub success: bool,
    pub file: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thresholds {
    pub auto_save: f64,
    pub highlight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub session_start: Option<DateTime<Utc>>,
    pub messages_processed: u64,
    pub high_scores_this_session: usize,
    pub last_consolidation: Option<DateTime<Utc>>,
    pub memory_files: usize,
    pub shadow_files: usize,
    pub context_messages: usize,
    pub thresholds: Thresholds,
}

/// Memory system bound to one workspace.
#[derive(Debug, Clone)]
pub struct MemorySystem {
    layout: WorkspaceLayout,
    config: ClawConfig,
    state: StateManager,
}

impl MemorySystem {
    pub fn new(config: ClawConfig) -> Self {
        let layout = WorkspaceLayout::new(config.workspace.clone());
        let state = StateManager::new(layout.experimental_dir());
        Self {
            layout,
            config,
            state,
        }
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn load_state(&self) -> Result<SystemState> {
        self.state.load_or_default(SYSTEM_STATE_KEY)
    }

    fn save_state(&self, state: &SystemState) -> Result<()> {
        self.state.save(SYSTEM_STATE_KEY, state)
    }

    pub fn load_session_context(&self) -> Result<SessionContext> {
        self.state.load_or_default(SESSION_CONTEXT_KEY)
    }

    /// Start a new session: sync context, scan for forgetting, reset counters.
    pub fn boot(&self, now: DateTime<Utc>) -> Result<BootReport> {
        let mut actions = Vec::new();

        actions.push(match &self.config.sync_cmd {
            Some(cmd) => {
                let result = run_command(cmd)?;
                let mut report = ActionReport::new("sync_context");
                report.success = Some(result.success);
                report.output = Some(result.summary(200));
                report
            }
            None => ActionReport::not_configured("sync_context"),
        });

        if let Some(cmd) = &self.config.forget_cmd {
            let result = run_command(cmd)?;
            if result.success {
                if let Some(candidates) = forgetting_candidates(&result) {
                    let mut report = ActionReport::new("forgetting_scan");
                    report.candidates = Some(candidates);
                    actions.push(report);
                }
            }
        }

        let mut state = self.load_state()?;
        state.session_start = Some(now);
        state.messages_processed = 0;
        state.high_scores.clear();
        self.save_state(&state)?;

        tracing::info!(workspace = %self.layout.root(), "memory system booted");
        Ok(BootReport {
            timestamp: now,
            actions,
            status: "ready".to_string(),
        })
    }

    /// Ask the configured analyzer for a verdict on `message`.
    pub fn analyze(&self, message: &str) -> Result<Analysis> {
        let Some(cmd) = &self.config.analyzer_cmd else {
            return Ok(Analysis::default());
        };

        let result = run_command_with_input(cmd, Some(message), DEFAULT_TIMEOUT)?;
        if !result.success {
            return Err(MemoryError::AnalyzerFailed(result.stderr.trim().to_string()).into());
        }
        Ok(Analysis::from_output(&result.stdout))
    }

    /// Score a message, update session state and render the debug string.
    pub fn process(&self, message: &str, now: DateTime<Utc>) -> Result<ProcessOutcome> {
        if message.trim().is_empty() {
            return Err(MemoryError::MissingArgument { what: "message" }.into());
        }

        let analysis = self.analyze(message)?;
        let combined = analysis.combined;
        let preview = truncate_chars(message, PREVIEW_LIMIT);

        let mut state = self.load_state()?;
        state.messages_processed += 1;

        let mut actions = Vec::new();
        if combined >= AUTO_SAVE_THRESHOLD {
            actions.push("Consider saving to memory".to_string());
            state.push_high_score(HighScore {
                timestamp: now,
                score: combined,
                preview: preview.clone(),
            });
        }
        if combined >= HIGHLIGHT_THRESHOLD {
            actions.push("High importance - strongly recommend saving".to_string());
        }
        self.save_state(&state)?;

        let band = ScoreBand::from_score(combined);
        let context_count = analysis.context_size;
        let tag = scoring::debug_tag(
            band.emoji(),
            combined,
            scoring::surprise_mark(&analysis.surprise),
            context_count,
        );

        tracing::debug!(score = combined, tag = %tag, "message processed");
        Ok(ProcessOutcome {
            timestamp: now,
            message_preview: preview,
            score: combined,
            flag: band.flag().map(str::to_string),
            flags: band.flags(),
            emoji: band.emoji().to_string(),
            debug: tag,
            context_count,
            analysis,
            actions,
            saved: false,
        })
    }

    /// Hook entry point: log the raw message, process it, update the session context.
    pub fn handle_message(
        &self,
        message: &MessageReceived,
        now: DateTime<Utc>,
    ) -> Result<(ProcessOutcome, SessionContext)> {
        RawLog::new(self.layout.raw_dir()).append(&RawEntry::from_message(message, now))?;

        let outcome = self.process(message.text(), now)?;

        let mut context = self.load_session_context()?;
        context.record(now.timestamp(), &outcome.analysis);
        self.state.save(SESSION_CONTEXT_KEY, &context)?;

        Ok((outcome, context))
    }

    /// Append content to the daily file or to `memory/<category>/<title>.md`.
    pub fn save(
        &self,
        content: &str,
        title: Option<&str>,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SaveReport> {
        if content.trim().is_empty() {
            return Err(MemoryError::MissingArgument { what: "content" }.into());
        }

        let relative = match category {
            Some(category) => {
                let name = title.unwrap_or("entry");
                reject_traversal(category)?;
                reject_traversal(name)?;
                Utf8PathBuf::from(category).join(format!("{}.md", name))
            }
            None => Utf8PathBuf::from(format!("{}.md", now.format("%Y-%m-%d"))),
        };

        let store = MarkdownStore::new(self.layout.memory_dir());
        let path = store.append(&relative, content, title)?;

        Ok(SaveReport {
            success: true,
            file: format!("memory/{}", relative),
            output: path.to_string(),
        })
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(MemoryError::MissingArgument { what: "query" }.into());
        }
        MarkdownStore::new(self.layout.memory_dir()).search(query, SEARCH_LIMIT)
    }

    pub fn status(&self) -> Result<StatusReport> {
        let state = self.load_state()?;
        let store = MarkdownStore::new(self.layout.memory_dir());

        Ok(StatusReport {
            session_start: state.session_start,
            messages_processed: state.messages_processed,
            high_scores_this_session: state.high_scores.len(),
            last_consolidation: state.last_consolidation,
            memory_files: store.memory_files().len(),
            shadow_files: markdown_files(&self.layout.shadow_dir()).len(),
            context_messages: self.host_context_messages()?,
            thresholds: Thresholds {
                auto_save: AUTO_SAVE_THRESHOLD,
                highlight: HIGHLIGHT_THRESHOLD,
            },
        })
    }

    fn host_context_messages(&self) -> Result<usize> {
        let path = self.layout.host_context_path();
        if !path.exists() {
            return Ok(0);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path))?;
        Ok(value
            .get("messages")
            .and_then(|m| m.as_array())
            .map_or(0, Vec::len))
    }

    /// Nightly run: consolidation, forgetting scan, timestamp.
    pub fn daily(&self, now: DateTime<Utc>) -> Result<DailyReport> {
        let mut actions = Vec::new();

        actions.push(match &self.config.consolidate_cmd {
            Some(cmd) => {
                let result = run_command(cmd)?;
                let mut report = ActionReport::new("consolidation");
                report.success = Some(result.success);
                report.output = Some(truncate_chars(&result.stdout, 500));
                report
            }
            None => ActionReport::not_configured("consolidation"),
        });

        actions.push(match &self.config.forget_cmd {
            Some(cmd) => {
                let result = run_command(cmd)?;
                let mut report = ActionReport::new("forgetting_scan");
                report.output = Some(truncate_chars(&result.stdout, 500));
                report
            }
            None => ActionReport::not_configured("forgetting_scan"),
        });

        let mut state = self.load_state()?;
        state.last_consolidation = Some(now);
        self.save_state(&state)?;

        Ok(DailyReport { actions })
    }
}

/// Entries of a forgetting scan not recommended to KEEP.
fn forgetting_candidates(result: &CommandResult) -> Option<usize> {
    let scan: Vec<serde_json::Value> = serde_json::from_str(result.stdout.trim()).ok()?;
    Some(
        scan.iter()
            .filter(|entry| entry.get("recommendation").and_then(|r| r.as_str()) != Some("KEEP"))
            .count(),
    )
}

fn reject_traversal(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.split(['/', '\\']).any(|part| part == "..") {
        anyhow::bail!("invalid memory path segment: {:?}", segment);
    }
    Ok(())
}

fn or_placeholder(value: Option<DateTime<Utc>>, fallback: &str) -> String {
    value.map_or_else(|| fallback.to_string(), |v| v.to_rfc3339())
}

/// Render a status report for the terminal.
pub fn format_status(status: &StatusReport) -> String {
    let lines = [
        "# Memory System Status".to_string(),
        "=".repeat(50),
        format!("Session start: {}", or_placeholder(status.session_start, "Not booted")),
        format!("Messages processed: {}", status.messages_processed),
        format!("High scores this session: {}", status.high_scores_this_session),
        format!("Last consolidation: {}", or_placeholder(status.last_consolidation, "Never")),
        String::new(),
        format!("Memory files: {}", status.memory_files),
        format!("Shadow files: {}", status.shadow_files),
        format!("Context messages: {}", status.context_messages),
        String::new(),
        "Thresholds:".to_string(),
        format!("  Auto-save: {:.1}", status.thresholds.auto_save),
        format!("  Highlight: {:.1}", status.thresholds.highlight),
    ];
    lines.join("\n")
}
