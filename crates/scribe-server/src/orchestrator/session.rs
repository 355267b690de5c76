// orchestrator/session.rs
// Process-lifetime session state and capture milestones

use chrono::{DateTime, Utc};

/// Capture-count milestones, ascending, each with its celebratory message
pub const MILESTONES: &[(u32, &str)] = &[
    (5, "Five captures this session - the journal is warming up."),
    (10, "Ten captures this session. That's a solid paper trail."),
    (25, "Twenty-five captures this session - prolific day."),
    (50, "Fifty captures this session. Half a hundred!"),
    (100, "One hundred captures in a single session. Legendary."),
];

/// Session-scoped counters. Not persisted; reset only when the host signals
/// a new session, never silently mid-session.
#[derive(Debug, Clone, Copy)]
pub struct SessionState {
    pub started_at: DateTime<Utc>,
    /// Gated suggestions surfaced this session (bounded by the session cap)
    pub suggestions_shown: u32,
    /// Captures made this session (drives milestone checks)
    pub captures_made: u32,
}

impl SessionState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            suggestions_shown: 0,
            captures_made: 0,
        }
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }
}

/// The milestone crossed by moving from `previous` to `current` captures,
/// if any. When a jump crosses several thresholds at once, the highest wins.
pub fn milestone_crossed(previous: u32, current: u32) -> Option<(u32, &'static str)> {
    MILESTONES
        .iter()
        .filter(|(threshold, _)| previous < *threshold && current >= *threshold)
        .next_back()
        .copied()
}
