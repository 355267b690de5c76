// analysis/types.rs
// Type definitions for change significance analysis

use serde::{Deserialize, Serialize};

use super::patterns::PatternTag;

/// Metadata about the file a change landed in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    pub path: String,
    pub language: Option<String>,
}

impl FileMeta {
    pub fn new(path: impl Into<String>, language: Option<String>) -> Self {
        Self {
            path: path.into(),
            language,
        }
    }
}

/// Category a change resolves to, from the highest-priority matched tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Feature,
    Fix,
    Refactor,
    Test,
    Docs,
    Performance,
    Security,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Test => "test",
            Self::Docs => "docs",
            Self::Performance => "performance",
            Self::Security => "security",
        }
    }
}

/// The most interesting sub-region of a change, with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedRegion {
    pub start_line: u32,
    pub end_line: u32,
    pub reason: String,
}

/// Significance verdict for a single change. Produced fresh per analysis
/// call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeAnalysis {
    pub is_interesting: bool,
    /// Composite significance score, always in [0, 100]
    pub score: u32,
    pub category: ChangeCategory,
    pub matched_patterns: Vec<PatternTag>,
    pub complexity_delta: i32,
    pub suggested_region: Option<SuggestedRegion>,
}

impl ChangeAnalysis {
    /// Zero verdict for empty or suppressed input
    pub fn uninteresting(complexity_delta: i32) -> Self {
        Self {
            is_interesting: false,
            score: 0,
            category: ChangeCategory::Feature,
            matched_patterns: Vec::new(),
            complexity_delta,
            suggested_region: None,
        }
    }
}
