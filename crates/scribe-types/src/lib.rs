// crates/scribe-types/src/lib.rs
// Shared types for Scribe (engine + editor hosts)
// No native-only dependencies allowed here

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════
// ACTIVITY SIGNALS
// ═══════════════════════════════════════

/// A contiguous range of lines touched by an edit (1-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditedRange {
    pub start_line: u32,
    pub end_line: u32,
}

impl EditedRange {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Number of lines covered by this range
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// Activity signal delivered by the host to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ActivitySignal {
    /// A document was saved; carries the full text and the just-applied edits
    Save {
        path: String,
        #[serde(default)]
        language: Option<String>,
        text: String,
        #[serde(default)]
        edited_ranges: Vec<EditedRange>,
    },
    /// A version-control commit was created
    Commit { hash: String, message: String },
    /// Periodic clock tick (hourly)
    Tick,
}

// ═══════════════════════════════════════
// SUGGESTIONS
// ═══════════════════════════════════════

/// Kinds of suggestion the engine can surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    /// "This change looks worth capturing"
    Capture,
    /// "You have enough material for a draft"
    Draft,
    /// Usage tip
    Tip,
    /// Weekly digest reminder (bypasses the adaptive gate)
    WeeklyReview,
    /// Milestone celebration (bypasses the adaptive gate)
    Milestone,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Draft => "draft",
            Self::Tip => "tip",
            Self::WeeklyReview => "weekly-review",
            Self::Milestone => "milestone",
        }
    }
}

impl std::str::FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capture" => Ok(Self::Capture),
            "draft" => Ok(Self::Draft),
            "tip" => Ok(Self::Tip),
            "weekly-review" => Ok(Self::WeeklyReview),
            "milestone" => Ok(Self::Milestone),
            other => Err(format!("unknown suggestion kind: {}", other)),
        }
    }
}

/// User response to a surfaced suggestion.
///
/// `None` means the host timed out or the user never interacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionResponse {
    Accept,
    Dismiss,
    SuppressMore,
    None,
}

impl SuggestionResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Dismiss => "dismiss",
            Self::SuppressMore => "suppress-more",
            Self::None => "none",
        }
    }
}

/// A suggestion request handed to the host for display.
///
/// `id` is a correlation id: the host echoes it back with the response so
/// the engine can match responses without a real interruption UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub id: String,
    pub kind: SuggestionKind,
    pub title: String,
    pub body: String,
    /// Short machine-readable trigger reason ("save", "commit", "draft-ready", ...)
    pub reason: String,
    /// Pattern tags attached by the analyzer (drives pattern-level learning)
    #[serde(default)]
    pub tags: Vec<String>,
}

// ═══════════════════════════════════════
// AGGREGATES
// ═══════════════════════════════════════

/// Aggregate quality label for accumulated captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftQuality {
    Low,
    Medium,
    High,
}

impl DraftQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}
