//! Score bands and debug tag rendering.
//!
//! The arousal score itself comes from the external analyzer; this module only
//! maps a combined score onto display glyphs and flags.

/// Score above this triggers auto-save consideration.
pub const AUTO_SAVE_THRESHOLD: f64 = 5.0;
/// Score above this is highlighted as important.
pub const HIGHLIGHT_THRESHOLD: f64 = 7.0;
/// Lower bound of the "notable" band.
pub const NOTABLE_THRESHOLD: f64 = 3.0;

/// Glyph shown before any message has been scored.
pub const UNSCORED_EMOJI: &str = "💭";

pub const FLAG_IMPORTANT: &str = "IMPORTANT";
pub const FLAG_SIGNIFICANT: &str = "SIGNIFICANT";

/// Band of a combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// Below 3
    Idle,
    /// 3 up to 5
    Notable,
    /// 5 up to 7
    Significant,
    /// 7 and above
    Important,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGHLIGHT_THRESHOLD {
            ScoreBand::Important
        } else if score >= AUTO_SAVE_THRESHOLD {
            ScoreBand::Significant
        } else if score >= NOTABLE_THRESHOLD {
            ScoreBand::Notable
        } else {
            ScoreBand::Idle
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ScoreBand::Important => "🔥",
            ScoreBand::Significant => "⚡",
            ScoreBand::Notable => "📊",
            ScoreBand::Idle => "💤",
        }
    }

    /// The single annotation flag of the band, if any.
    pub fn flag(self) -> Option<&'static str> {
        match self {
            ScoreBand::Important => Some(FLAG_IMPORTANT),
            ScoreBand::Significant => Some(FLAG_SIGNIFICANT),
            ScoreBand::Notable | ScoreBand::Idle => None,
        }
    }

    pub fn flags(self) -> Vec<String> {
        self.flag().map(str::to_string).into_iter().collect()
    }
}

/// Suffix appended to the score for the analyzer's surprise level.
pub fn surprise_mark(surprise: &str) -> &'static str {
    match surprise {
        "moderate" => "?",
        "high" => "!",
        "shocking" => "‼️",
        _ => "",
    }
}

/// Render `[emoji score<mark> ctx:N⟳]`.
pub fn debug_tag(emoji: &str, score: f64, mark: &str, context_count: u64) -> String {
    format!("[{} {:.1}{} ctx:{}⟳]", emoji, score, mark, context_count)
}
