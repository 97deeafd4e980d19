//! Experiential memory for the clawd workspace.
//!
//! Provides:
//! - Workspace layout
//! - Session context and state schema
//! - Score banding and debug tags
//! - Markdown memory and raw JSONL logs
//! - The memory-system pipeline
//! - Satisfaction tracking

pub mod error;
pub mod layout;
pub mod satisfaction;
pub mod schema;
pub mod scoring;
pub mod storage;
pub mod system;

pub use error::MemoryError;
pub use layout::WorkspaceLayout;
pub use satisfaction::{PatternAnalysis, SatisfactionTracker, detect_signal};
pub use schema::{
    Analysis, HighScore, Incident, LastMessage, SessionContext, Signal, SystemState, TrackerData,
};
pub use scoring::{AUTO_SAVE_THRESHOLD, HIGHLIGHT_THRESHOLD, ScoreBand};
pub use storage::{MarkdownStore, RawEntry, RawLog, SearchHit};
pub use system::{MemorySystem, ProcessOutcome, StatusReport};
