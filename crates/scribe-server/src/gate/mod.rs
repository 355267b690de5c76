// crates/scribe-server/src/gate/
// Adaptive notification gating: decides whether a suggestion may surface
// now, based on session limits, acceptance-adaptive cooldowns and a
// deep-work heuristic. Learns from user responses via NotificationStats.

pub mod stats;

pub use stats::{KindStats, NotificationStats, PatternStats};

use chrono::{DateTime, Duration, Utc};
use scribe_types::{SuggestionKind, SuggestionResponse};

/// Hard cap on gated suggestions per session
pub const MAX_SUGGESTIONS_PER_SESSION: u32 = 5;
/// Deep-work window: any notification event this recent suppresses the next
pub const DEEP_WORK_WINDOW_SECS: i64 = 120;
/// Acceptance rate below which the cooldown doubles
pub const LOW_ACCEPTANCE_RATE: f64 = 0.3;
/// Acceptance rate above which the cooldown halves
pub const HIGH_ACCEPTANCE_RATE: f64 = 0.7;

/// Outcome of a gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Show,
    Suppress(SuppressReason),
}

impl GateDecision {
    pub fn is_show(&self) -> bool {
        matches!(self, GateDecision::Show)
    }
}

/// Which check rejected the suggestion (for logging and tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    SessionCap,
    GlobalCooldown,
    KindCooldown,
    DeepWork,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionCap => "session cap",
            Self::GlobalCooldown => "global cooldown",
            Self::KindCooldown => "per-kind cooldown",
            Self::DeepWork => "deep work",
        }
    }
}

/// The adaptive gate. Owns the learning state; the orchestrator owns the
/// session counters and persistence lifecycle.
#[derive(Debug)]
pub struct AdaptiveNotificationGate {
    base_cooldown: Duration,
    pub stats: NotificationStats,
}

impl AdaptiveNotificationGate {
    pub fn new(base_cooldown: Duration, stats: NotificationStats) -> Self {
        Self {
            base_cooldown,
            stats,
        }
    }

    /// Cooldown for a kind after the persistent multiplier and the
    /// acceptance adaptation: doubled when the user ignores this kind often,
    /// halved when they engage often.
    pub fn effective_cooldown(&self, kind: SuggestionKind) -> Duration {
        let mut secs = self.base_cooldown.num_seconds() as f64 * self.stats.cooldown_multiplier;
        let rate = self.stats.acceptance_rate(kind);
        if rate < LOW_ACCEPTANCE_RATE {
            secs *= 2.0;
        } else if rate > HIGH_ACCEPTANCE_RATE {
            secs /= 2.0;
        }
        Duration::seconds(secs as i64)
    }

    /// Run the gate checks in order. All must pass for a suggestion to
    /// surface; the first failing check is reported.
    pub fn evaluate(
        &self,
        kind: SuggestionKind,
        session_shown: u32,
        now: DateTime<Utc>,
    ) -> GateDecision {
        // 1. Session cap
        if session_shown >= MAX_SUGGESTIONS_PER_SESSION {
            return GateDecision::Suppress(SuppressReason::SessionCap);
        }

        // 2. Acceptance-adaptive cooldown
        let cooldown = self.effective_cooldown(kind);

        // 3. Global cooldown (since any gated notification)
        if let Some(last) = self.stats.last_any_shown
            && now - last < cooldown
        {
            return GateDecision::Suppress(SuppressReason::GlobalCooldown);
        }

        // 4. Per-kind cooldown
        if let Some(last) = self.stats.last_shown.get(kind.as_str())
            && now - *last < cooldown
        {
            return GateDecision::Suppress(SuppressReason::KindCooldown);
        }

        // 5. Deep-work suppression: the user just got interrupted by
        // something (possibly a bypass notification) - leave them alone.
        if let Some(last) = self.stats.last_event
            && now - last < Duration::seconds(DEEP_WORK_WINDOW_SECS)
        {
            return GateDecision::Suppress(SuppressReason::DeepWork);
        }

        GateDecision::Show
    }

    /// Record a surfaced suggestion (before awaiting the user's response)
    pub fn record_shown(&mut self, kind: SuggestionKind, tags: &[String], now: DateTime<Utc>) {
        self.stats.record_shown(kind, tags, now);
    }

    /// Record the user's terminal response
    pub fn record_response(
        &mut self,
        kind: SuggestionKind,
        tags: &[String],
        response: SuggestionResponse,
    ) {
        self.stats.record_response(kind, tags, response);
    }

    /// Stamp a bypass notification (milestone, digest) for deep-work tracking
    pub fn record_bypass_event(&mut self, now: DateTime<Utc>) {
        self.stats.record_bypass_event(now);
    }
}
