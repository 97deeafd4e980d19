//! Persisted documents of the memory system.

use crate::error::MemoryError;
use crate::scoring::{self, ScoreBand, UNSCORED_EMOJI};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Latest scored message as shown in the session context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMessage {
    /// Epoch seconds, 0 before the first message
    pub timestamp: i64,
    pub score: f64,
    pub emoji: String,
    #[serde(default)]
    pub flags: Vec<String>,
    /// Whether the message was persisted to long-term memory
    #[serde(default)]
    pub saved: bool,
}

impl Default for LastMessage {
    fn default() -> Self {
        Self {
            timestamp: 0,
            score: 0.0,
            emoji: UNSCORED_EMOJI.to_string(),
            flags: Vec::new(),
            saved: false,
        }
    }
}

/// `memory/_experimental/session-context.json`.
///
/// The default value is the template written at install time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub last_message: LastMessage,
    pub session_context_count: u64,
    pub debug_tag: String,
}

impl Default for SessionContext {
    fn default() -> Self {
        let last_message = LastMessage::default();
        let debug_tag = scoring::debug_tag(&last_message.emoji, last_message.score, "", 0);
        Self {
            last_message,
            session_context_count: 0,
            debug_tag,
        }
    }
}

impl SessionContext {
    /// Record a newly scored message and re-render the debug tag.
    pub fn record(&mut self, timestamp: i64, analysis: &Analysis) {
        let band = ScoreBand::from_score(analysis.combined);
        self.last_message = LastMessage {
            timestamp,
            score: analysis.combined,
            emoji: band.emoji().to_string(),
            flags: band.flags(),
            saved: false,
        };
        self.session_context_count += 1;
        self.debug_tag = scoring::debug_tag(
            &self.last_message.emoji,
            self.last_message.score,
            scoring::surprise_mark(&analysis.surprise),
            self.session_context_count,
        );
    }
}

/// Entry of the per-session high score list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScore {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub preview: String,
}

/// `memory/_experimental/system-state.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    #[serde(default)]
    pub session_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages_processed: u64,
    #[serde(default)]
    pub high_scores: Vec<HighScore>,
    #[serde(default)]
    pub last_consolidation: Option<DateTime<Utc>>,
}

/// Number of high scores kept per session.
pub const MAX_HIGH_SCORES: usize = 10;

impl SystemState {
    /// Push a high score, keeping only the most recent ones.
    pub fn push_high_score(&mut self, entry: HighScore) {
        self.high_scores.push(entry);
        if self.high_scores.len() > MAX_HIGH_SCORES {
            let excess = self.high_scores.len() - MAX_HIGH_SCORES;
            self.high_scores.drain(..excess);
        }
    }
}

const ANALYSIS_FIELDS: [&str; 5] = ["combined", "arousal", "pe", "surprise", "context_size"];

/// Analyzer verdict for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    /// Combined arousal and prediction-error score
    pub combined: f64,
    pub arousal: f64,
    /// Prediction error
    pub pe: f64,
    /// Surprise level (mild, moderate, high, shocking)
    pub surprise: String,
    /// Messages in the analyzer's context window
    pub context_size: u64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            combined: 2.0,
            arousal: 1.5,
            pe: 0.3,
            surprise: "mild".to_string(),
            context_size: 0,
            extra: HashMap::new(),
        }
    }
}

impl Analysis {
    /// Parse analyzer stdout, falling back to the neutral verdict.
    ///
    /// Each known field is read on its own; a missing or off-type field keeps
    /// its default without discarding the others.
    pub fn from_output(stdout: &str) -> Self {
        let object = match serde_json::from_str::<serde_json::Value>(stdout.trim()) {
            Ok(serde_json::Value::Object(object)) => object,
            Ok(_) => {
                tracing::warn!("analyzer output is not a JSON object, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "analyzer output is not JSON, using defaults");
                return Self::default();
            }
        };

        let defaults = Self::default();
        let number = |key: &str, fallback: f64| {
            object.get(key).and_then(|v| v.as_f64()).unwrap_or(fallback)
        };
        let context_size = object
            .get("context_size")
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)))
            .unwrap_or(defaults.context_size);
        let surprise = object
            .get("surprise")
            .and_then(|v| v.as_str())
            .map_or(defaults.surprise, str::to_string);

        Self {
            combined: number("combined", defaults.combined),
            arousal: number("arousal", defaults.arousal),
            pe: number("pe", defaults.pe),
            surprise,
            context_size,
            extra: object
                .into_iter()
                .filter(|(key, _)| !ANALYSIS_FIELDS.contains(&key.as_str()))
                .collect(),
        }
    }
}

/// Satisfaction signal of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Negative,
    Positive,
    Interested,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Negative => "negative",
            Signal::Positive => "positive",
            Signal::Interested => "interested",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "negative" => Ok(Signal::Negative),
            "positive" => Ok(Signal::Positive),
            "interested" => Ok(Signal::Interested),
            _ => Err(MemoryError::UnknownSignal(s.to_string())),
        }
    }
}

/// One recorded satisfaction incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// `%Y%m%d_%H%M%S` of the record time
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub signal: Signal,
    pub context: String,
    pub user_message: String,
    pub my_response: String,
    pub analysis: String,
}

/// `memory/satisfaction-tracker.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerData {
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub patterns: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub last_summary: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_context_template() {
        let ctx = SessionContext::default();
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["lastMessage"]["timestamp"], 0);
        assert_eq!(value["lastMessage"]["score"].as_f64(), Some(0.0));
        assert_eq!(value["lastMessage"]["emoji"], "💭");
        assert_eq!(value["lastMessage"]["flags"], serde_json::json!([]));
        assert_eq!(value["lastMessage"]["saved"], false);
        assert_eq!(value["sessionContextCount"], 0);
        assert_eq!(value["debugTag"], "[💭 0.0 ctx:0⟳]");
    }

    #[test]
    fn test_session_context_accepts_integer_score() {
        let json = r#"{
            "lastMessage": {"timestamp": 0, "score": 0, "emoji": "💭", "flags": [], "saved": false},
            "sessionContextCount": 0,
            "debugTag": "[💭 0.0 ctx:0⟳]"
        }"#;
        let ctx: SessionContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx, SessionContext::default());
    }

    #[test]
    fn test_session_context_record() {
        let mut ctx = SessionContext::default();
        let analysis = Analysis {
            combined: 7.5,
            surprise: "high".to_string(),
            ..Analysis::default()
        };
        ctx.record(1_700_000_000, &analysis);

        assert_eq!(ctx.last_message.timestamp, 1_700_000_000);
        assert_eq!(ctx.last_message.emoji, "🔥");
        assert_eq!(ctx.last_message.flags, vec!["IMPORTANT"]);
        assert!(!ctx.last_message.saved);
        assert_eq!(ctx.session_context_count, 1);
        assert_eq!(ctx.debug_tag, "[🔥 7.5! ctx:1⟳]");
    }

    #[test]
    fn test_high_score_cap() {
        let mut state = SystemState::default();
        for i in 0..15 {
            state.push_high_score(HighScore {
                timestamp: Utc::now(),
                score: i as f64,
                preview: format!("msg {}", i),
            });
        }
        assert_eq!(state.high_scores.len(), MAX_HIGH_SCORES);
        assert_eq!(state.high_scores[0].preview, "msg 5");
        assert_eq!(state.high_scores[9].preview, "msg 14");
    }

    #[test]
    fn test_analysis_parsing() {
        let analysis = Analysis::from_output(r#"{"combined": 6.1, "surprise": "moderate", "context_size": 4, "novelty": 0.9}"#);
        assert_eq!(analysis.combined, 6.1);
        assert_eq!(analysis.arousal, 1.5);
        assert_eq!(analysis.context_size, 4);
        assert!(analysis.extra.contains_key("novelty"));

        let fallback = Analysis::from_output("combined: 9");
        assert_eq!(fallback, Analysis::default());
    }

    #[test]
    fn test_analysis_keeps_score_when_other_fields_are_off_type() {
        let analysis = Analysis::from_output(r#"{"combined": 8.5, "surprise": null, "context_size": 3}"#);
        assert_eq!(analysis.combined, 8.5);
        assert_eq!(analysis.surprise, "mild");
        assert_eq!(analysis.context_size, 3);

        let analysis = Analysis::from_output(r#"{"combined": 6.0, "context_size": 4.0, "pe": "high"}"#);
        assert_eq!(analysis.combined, 6.0);
        assert_eq!(analysis.context_size, 4);
        assert_eq!(analysis.pe, 0.3);
        assert!(analysis.extra.is_empty());

        assert_eq!(Analysis::from_output("[8.5]"), Analysis::default());
    }

    #[test]
    fn test_signal_from_str() {
        assert_eq!("Negative".parse::<Signal>().unwrap(), Signal::Negative);
        assert_eq!("interested".parse::<Signal>().unwrap(), Signal::Interested);
        assert!("meh".parse::<Signal>().is_err());
    }

    #[test]
    fn test_system_state_python_timestamps() {
        let json = r#"{
            "session_start": "2026-01-05T09:30:00.123456Z",
            "messages_processed": 3,
            "high_scores": [],
            "last_consolidation": null
        }"#;
        let state: SystemState = serde_json::from_str(json).unwrap();
        assert_eq!(state.messages_processed, 3);
        assert!(state.session_start.is_some());
        assert!(state.last_consolidation.is_none());
    }
}
