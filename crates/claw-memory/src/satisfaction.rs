//! User satisfaction and interest tracking.
//!
//! Records emotional signals, analyzes patterns over a time window, and writes
//! the daily summary and `LEARNING.md` behavioural insight documents.

use crate::layout::WorkspaceLayout;
use crate::schema::{Incident, Signal, TrackerData};
use crate::storage::truncate_chars;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

const MESSAGE_LIMIT: usize = 200;
const RECENT_INCIDENTS: usize = 5;
const LEARNING_WINDOW_DAYS: i64 = 30;
const LEARNING_SAMPLE: usize = 50;
const TOP_CONTEXTS: usize = 10;
const HIGH_CONCERN_RATIO: f64 = 0.3;

const NEGATIVE_PATTERNS: &[&str] = &[
    "not satisfied",
    "unsatisfying",
    "disappointed",
    "frustrated",
    "that's not what i",
    "you don't understand",
    "no that's wrong",
    "i'm worried about your ability",
    "concerning",
    "this is a problem",
    "you missed",
    "you forgot",
    "you didn't",
    "why didn't you",
];

const POSITIVE_PATTERNS: &[&str] = &[
    "perfect",
    "exactly",
    "great",
    "excellent",
    "love it",
    "that's what i wanted",
    "super interested",
    "this is good",
    "nice",
    "well done",
    "impressive",
    "smart",
];

const INTEREST_PATTERNS: &[&str] = &[
    "interesting",
    "tell me more",
    "i want to know",
    "curious about",
    "what about",
    "can you explain",
];

/// Detect a satisfaction signal. Negative beats positive beats interest.
pub fn detect_signal(message: &str) -> Option<Signal> {
    let lower = message.to_lowercase();
    let matches = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

    if matches(NEGATIVE_PATTERNS) {
        Some(Signal::Negative)
    } else if matches(POSITIVE_PATTERNS) {
        Some(Signal::Positive)
    } else if matches(INTEREST_PATTERNS) {
        Some(Signal::Interested)
    } else {
        None
    }
}

/// Aggregate over a time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub period: String,
    pub total_incidents: usize,
    pub signal_breakdown: BTreeMap<String, usize>,
    pub satisfaction_ratio: f64,
    pub concern_ratio: f64,
    pub common_contexts: Vec<String>,
    pub recent_incidents: Vec<Incident>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PatternAnalysis {
    Empty { message: String },
    Report(PatternReport),
}

impl PatternAnalysis {
    pub fn total_incidents(&self) -> usize {
        match self {
            PatternAnalysis::Empty { .. } => 0,
            PatternAnalysis::Report(r) => r.total_incidents,
        }
    }

    pub fn satisfaction_ratio(&self) -> f64 {
        match self {
            PatternAnalysis::Empty { .. } => 0.0,
            PatternAnalysis::Report(r) => r.satisfaction_ratio,
        }
    }

    pub fn concern_ratio(&self) -> f64 {
        match self {
            PatternAnalysis::Empty { .. } => 0.0,
            PatternAnalysis::Report(r) => r.concern_ratio,
        }
    }
}

/// Tracker bound to one workspace.
#[derive(Debug, Clone)]
pub struct SatisfactionTracker {
    layout: WorkspaceLayout,
}

impl SatisfactionTracker {
    pub fn new(layout: WorkspaceLayout) -> Self {
        Self { layout }
    }

    pub fn load(&self) -> Result<TrackerData> {
        let path = self.layout.tracker_path();
        if !path.exists() {
            return Ok(TrackerData::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read tracker: {}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse tracker: {}", path))
    }

    fn save(&self, data: &TrackerData) -> Result<()> {
        let path = self.layout.tracker_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent))?;
        }
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content).with_context(|| format!("Failed to write tracker: {}", path))
    }

    /// Record an incident and return its id.
    pub fn record(
        &self,
        signal: Signal,
        context: &str,
        user_message: &str,
        my_response: &str,
        analysis: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let mut data = self.load()?;

        let incident = Incident {
            id: now.format("%Y%m%d_%H%M%S").to_string(),
            timestamp: now,
            signal,
            context: context.to_string(),
            user_message: truncate_chars(user_message, MESSAGE_LIMIT),
            my_response: truncate_chars(my_response, MESSAGE_LIMIT),
            analysis: analysis.unwrap_or("Pending analysis").to_string(),
        };
        let id = incident.id.clone();

        data.incidents.push(incident);
        self.save(&data)?;
        tracing::info!(id = %id, signal = %signal, "satisfaction incident recorded");
        Ok(id)
    }

    /// Analyze incidents of the last `since_days` days.
    pub fn analyze(&self, since_days: i64, now: DateTime<Utc>) -> Result<PatternAnalysis> {
        let data = self.load()?;
        Ok(analyze_incidents(&data.incidents, since_days, now))
    }

    /// Write today's summary. `None` when nothing was recorded today.
    pub fn daily_summary(&self, now: DateTime<Utc>) -> Result<Option<Utf8PathBuf>> {
        let mut data = self.load()?;
        let today = now.date_naive();

        let today_incidents: Vec<&Incident> = data
            .incidents
            .iter()
            .filter(|inc| inc.timestamp.date_naive() == today)
            .collect();

        if today_incidents.is_empty() {
            return Ok(None);
        }

        let patterns = analyze_incidents(&data.incidents, 7, now);
        let summary = render_daily_summary(&today_incidents, &patterns, now);

        let dir = self.layout.insights_dir();
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create directory: {}", dir))?;
        let path = dir.join(format!("{}_daily_summary.md", today.format("%Y-%m-%d")));
        fs::write(&path, summary).with_context(|| format!("Failed to write summary: {}", path))?;

        data.last_summary = Some(today);
        self.save(&data)?;
        Ok(Some(path))
    }

    /// Rewrite `LEARNING.md` from the last 30 days.
    pub fn update_learning(&self, now: DateTime<Utc>) -> Result<Utf8PathBuf> {
        let data = self.load()?;
        let patterns = analyze_incidents(&data.incidents, LEARNING_WINDOW_DAYS, now);
        let doc = render_learning(&data.incidents, &patterns, now);

        let path = self.layout.learning_path();
        fs::write(&path, doc).with_context(|| format!("Failed to write {}", path))?;
        Ok(path)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

fn analyze_incidents(incidents: &[Incident], since_days: i64, now: DateTime<Utc>) -> PatternAnalysis {
    // A window reaching past the representable range covers every incident.
    let cutoff = Duration::try_days(since_days).and_then(|d| now.checked_sub_signed(d));
    let recent: Vec<&Incident> = incidents
        .iter()
        .filter(|inc| cutoff.is_none_or(|c| inc.timestamp >= c))
        .collect();

    if recent.is_empty() {
        return PatternAnalysis::Empty {
            message: "No incidents in the specified period".to_string(),
        };
    }

    let mut signal_breakdown = BTreeMap::new();
    for inc in &recent {
        *signal_breakdown.entry(inc.signal.as_str().to_string()).or_insert(0) += 1;
    }

    let mut common_contexts: Vec<String> = Vec::new();
    for inc in &recent {
        if !common_contexts.contains(&inc.context) {
            common_contexts.push(inc.context.clone());
        }
    }

    let total = recent.len();
    let count = |s: Signal| signal_breakdown.get(s.as_str()).copied().unwrap_or(0);
    let satisfaction_ratio = round2(count(Signal::Positive) as f64 / total as f64);
    let concern_ratio = round2(count(Signal::Negative) as f64 / total as f64);

    let recent_incidents = recent[recent.len().saturating_sub(RECENT_INCIDENTS)..]
        .iter()
        .map(|inc| (*inc).clone())
        .collect();

    PatternAnalysis::Report(PatternReport {
        period: format!("Last {} days", since_days),
        total_incidents: total,
        signal_breakdown,
        satisfaction_ratio,
        concern_ratio,
        common_contexts,
        recent_incidents,
    })
}

fn render_daily_summary(today: &[&Incident], patterns: &PatternAnalysis, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!("# Satisfaction Summary - {}", now.date_naive().format("%Y-%m-%d")),
        String::new(),
        format!("**Today's Incidents:** {}", today.len()),
        format!("**7-Day Satisfaction Ratio:** {}", percent(patterns.satisfaction_ratio())),
        format!("**7-Day Concern Ratio:** {}", percent(patterns.concern_ratio())),
        String::new(),
        "## Today's Incidents".to_string(),
        String::new(),
    ];

    for inc in today {
        lines.push(format!(
            "### {} - {}",
            inc.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            inc.signal.as_str().to_uppercase()
        ));
        lines.push(format!("**Context:** {}", inc.context));
        lines.push(format!("**User:** {}...", truncate_chars(&inc.user_message, 100)));
        lines.push(format!("**Analysis:** {}", inc.analysis));
        lines.push(String::new());
    }

    lines.push("## Key Learnings".to_string());
    lines.push(String::new());

    let negative: Vec<&&Incident> = today.iter().filter(|i| i.signal == Signal::Negative).collect();
    if !negative.is_empty() {
        lines.push("**Areas for Improvement:**".to_string());
        for inc in negative {
            lines.push(format!("- {}: {}", inc.context, inc.analysis));
        }
        lines.push(String::new());
    }

    let positive: Vec<&&Incident> = today.iter().filter(|i| i.signal == Signal::Positive).collect();
    if !positive.is_empty() {
        lines.push("**What Worked Well:**".to_string());
        for inc in positive {
            lines.push(format!("- {}", inc.context));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Contexts of `signal` among `incidents`, most frequent first, ties in first-seen order.
fn ranked_contexts(incidents: &[Incident], signal: Signal) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for inc in incidents.iter().filter(|i| i.signal == signal) {
        match counts.iter_mut().find(|(ctx, _)| *ctx == inc.context) {
            Some((_, n)) => *n += 1,
            None => counts.push((inc.context.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn render_learning(incidents: &[Incident], patterns: &PatternAnalysis, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        "# LEARNING.md - Behavioral Insights".to_string(),
        String::new(),
        "This file contains automatically-generated insights from user satisfaction tracking."
            .to_string(),
        "It informs my behavioral adjustments and response patterns.".to_string(),
        String::new(),
        format!(
            "**Last Updated:** {}",
            now.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        format!("**Data Period:** Last {} days", LEARNING_WINDOW_DAYS),
        String::new(),
        "---".to_string(),
        String::new(),
        "## Satisfaction Metrics".to_string(),
        String::new(),
        format!("- **Total Interactions Analyzed:** {}", patterns.total_incidents()),
        format!("- **Satisfaction Ratio:** {}", percent(patterns.satisfaction_ratio())),
        format!("- **Concern Ratio:** {}", percent(patterns.concern_ratio())),
        String::new(),
        "## Behavioral Patterns".to_string(),
        String::new(),
    ];

    let sample = &incidents[incidents.len().saturating_sub(LEARNING_SAMPLE)..];
    let negative = ranked_contexts(sample, Signal::Negative);
    let positive = ranked_contexts(sample, Signal::Positive);

    for (heading, ranked) in [
        ("### Things That Cause Dissatisfaction", &negative),
        ("### Things That Work Well", &positive),
    ] {
        if ranked.is_empty() {
            continue;
        }
        lines.push(heading.to_string());
        lines.push(String::new());
        for (ctx, count) in ranked.iter().take(TOP_CONTEXTS) {
            lines.push(format!("- **{}** (occurred {}x)", ctx, count));
        }
        lines.push(String::new());
    }

    lines.push("## Actionable Insights".to_string());
    lines.push(String::new());
    lines.push("Based on the data above, here are the key behavioral adjustments:".to_string());
    lines.push(String::new());

    if patterns.concern_ratio() > HIGH_CONCERN_RATIO {
        lines.push("⚠️ **HIGH CONCERN RATIO** - Review negative incidents and adjust behavior".to_string());
    }
    if let Some((ctx, _)) = negative.first() {
        lines.push(format!("🔴 **Primary Concern Area:** {}", ctx));
    }
    if let Some((ctx, _)) = positive.first() {
        lines.push(format!("✅ **Keep Doing:** {}", ctx));
    }

    lines.extend([
        String::new(),
        "---".to_string(),
        String::new(),
        "**Note:** This file is auto-generated by `scripts/satisfaction-tracker`.".to_string(),
        "It is updated daily by cron and read by the agent on startup.".to_string(),
    ]);

    lines.join("\n")
}
