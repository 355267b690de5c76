// crates/scribe-server/src/activity/mod.rs
// Per-file activity state: last-known complexity, line count, analysis time

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::analysis::complexity::structural_complexity;

/// How long a document state is retained without a new analysis
pub const STATE_RETENTION_HOURS: i64 = 24;

/// Last-known analysis state for a single file.
///
/// Owned exclusively by the tracker; other components only see the delta
/// that `record_and_diff` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentState {
    pub complexity: u32,
    pub line_count: u32,
    pub last_analyzed_at: DateTime<Utc>,
}

/// Per-file memory of structural complexity, with time-based eviction
#[derive(Debug, Default)]
pub struct ActivityStateTracker {
    states: HashMap<String, DocumentState>,
}

impl ActivityStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the complexity of `text`, diff against the stored state for
    /// `file_id`, and replace the stored state.
    ///
    /// A missing previous entry is a normal case (fresh file): delta 0.
    pub fn record_and_diff(&mut self, file_id: &str, text: &str, now: DateTime<Utc>) -> i32 {
        let complexity = structural_complexity(text);
        let delta = self
            .states
            .get(file_id)
            .map(|prev| complexity as i32 - prev.complexity as i32)
            .unwrap_or(0);

        self.states.insert(
            file_id.to_string(),
            DocumentState {
                complexity,
                line_count: text.lines().count() as u32,
                last_analyzed_at: now,
            },
        );

        delta
    }

    /// Remove entries whose last analysis is older than `max_age`.
    /// Runs on a slow periodic timer to bound memory, never on the hot path.
    pub fn evict_stale(&mut self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let before = self.states.len();
        self.states.retain(|_, state| now - state.last_analyzed_at <= max_age);
        before - self.states.len()
    }

    pub fn get(&self, file_id: &str) -> Option<&DocumentState> {
        self.states.get(file_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
