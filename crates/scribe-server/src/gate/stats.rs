// gate/stats.rs
// Persisted notification statistics - the gate's learning state.
//
// Stored as a single JSON document under the "notification_stats" key in
// kv_store. Loaded once at startup; flushed after every surface and every
// terminal response. Missing or corrupt data initializes to defaults and
// never fails hard.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use scribe_types::{SuggestionKind, SuggestionResponse};

/// kv_store key the stats document lives under
pub const STATS_KEY: &str = "notification_stats";

/// Acceptance rate assumed for a kind with no history
pub const DEFAULT_ACCEPTANCE_RATE: f64 = 0.5;

/// Accept/dismiss counters for one suggestion kind
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindStats {
    pub accepted: u64,
    pub dismissed: u64,
}

/// Shown/accepted counters for one pattern tag
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternStats {
    pub shown: u64,
    pub accepted: u64,
}

/// Cumulative notification statistics, persisted across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationStats {
    /// Accept/dismiss counts per suggestion kind
    #[serde(default)]
    pub kinds: HashMap<String, KindStats>,
    /// Shown/accepted counts per pattern tag
    #[serde(default)]
    pub patterns: HashMap<String, PatternStats>,
    /// Last time a suggestion of each kind was surfaced
    #[serde(default)]
    pub last_shown: HashMap<String, DateTime<Utc>>,
    /// Last time any gated suggestion was surfaced
    #[serde(default)]
    pub last_any_shown: Option<DateTime<Utc>>,
    /// Last notification event of any sort, including bypass notifications.
    /// Drives the deep-work suppression window.
    #[serde(default)]
    pub last_event: Option<DateTime<Utc>>,
    /// Persistent cooldown multiplier, doubled by "suppress more"
    #[serde(default = "default_multiplier")]
    pub cooldown_multiplier: f64,
    /// When the weekly digest last fired
    #[serde(default)]
    pub last_digest_at: Option<DateTime<Utc>>,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Default for NotificationStats {
    fn default() -> Self {
        Self {
            kinds: HashMap::new(),
            patterns: HashMap::new(),
            last_shown: HashMap::new(),
            last_any_shown: None,
            last_event: None,
            cooldown_multiplier: 1.0,
            last_digest_at: None,
        }
    }
}

impl NotificationStats {
    /// Acceptance rate for a kind; 0.5 with no history
    pub fn acceptance_rate(&self, kind: SuggestionKind) -> f64 {
        match self.kinds.get(kind.as_str()) {
            Some(stats) if stats.accepted + stats.dismissed > 0 => {
                stats.accepted as f64 / (stats.accepted + stats.dismissed) as f64
            }
            _ => DEFAULT_ACCEPTANCE_RATE,
        }
    }

    /// Record that a gated suggestion was surfaced.
    ///
    /// Pattern `shown` counters are incremented here, strictly before any
    /// response can increment `accepted` - an accepted count can never
    /// exceed its shown count.
    pub fn record_shown(&mut self, kind: SuggestionKind, tags: &[String], now: DateTime<Utc>) {
        for tag in tags {
            self.patterns.entry(tag.clone()).or_default().shown += 1;
        }
        self.last_shown.insert(kind.as_str().to_string(), now);
        self.last_any_shown = Some(now);
        self.last_event = Some(now);
    }

    /// Stamp a bypass notification (milestone, digest) without touching the
    /// gated cooldown timestamps.
    pub fn record_bypass_event(&mut self, now: DateTime<Utc>) {
        self.last_event = Some(now);
    }

    /// Record the user's terminal response to a surfaced suggestion
    pub fn record_response(
        &mut self,
        kind: SuggestionKind,
        tags: &[String],
        response: SuggestionResponse,
    ) {
        match response {
            SuggestionResponse::Accept => {
                self.kinds.entry(kind.as_str().to_string()).or_default().accepted += 1;
                for tag in tags {
                    let entry = self.patterns.entry(tag.clone()).or_default();
                    if entry.accepted < entry.shown {
                        entry.accepted += 1;
                    }
                }
            }
            SuggestionResponse::Dismiss => {
                self.kinds.entry(kind.as_str().to_string()).or_default().dismissed += 1;
            }
            SuggestionResponse::SuppressMore => {
                self.kinds.entry(kind.as_str().to_string()).or_default().dismissed += 1;
                self.cooldown_multiplier *= 2.0;
            }
            SuggestionResponse::None => {}
        }
    }

    /// Load from kv_store, defaulting on any missing or malformed data
    pub fn load_sync(conn: &Connection) -> Self {
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                [STATS_KEY],
                |row| row.get(0),
            )
            .optional()
            .ok()
            .flatten();

        match raw {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("malformed notification stats, resetting: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Flush to kv_store
    pub fn save_sync(&self, conn: &Connection, now: DateTime<Utc>) -> Result<()> {
        let json = serde_json::to_string(self)?;
        conn.execute(
            r#"INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                              updated_at = excluded.updated_at"#,
            params![STATS_KEY, json, crate::db::captures::to_db_timestamp(now)],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::schema::run_all_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_acceptance_rate_defaults_to_half() {
        let stats = NotificationStats::default();
        assert_eq!(stats.acceptance_rate(SuggestionKind::Capture), 0.5);
    }

    #[test]
    fn test_acceptance_rate_after_dismissals() {
        let mut stats = NotificationStats::default();
        for _ in 0..3 {
            stats.record_response(SuggestionKind::Capture, &[], SuggestionResponse::Dismiss);
        }
        assert_eq!(stats.acceptance_rate(SuggestionKind::Capture), 0.0);

        stats.record_response(SuggestionKind::Capture, &[], SuggestionResponse::Accept);
        assert_eq!(stats.acceptance_rate(SuggestionKind::Capture), 0.25);
    }

    #[test]
    fn test_accepted_never_exceeds_shown() {
        let mut stats = NotificationStats::default();
        let tags = vec!["bug-fix".to_string()];
        let now = Utc::now();

        stats.record_shown(SuggestionKind::Capture, &tags, now);
        stats.record_response(SuggestionKind::Capture, &tags, SuggestionResponse::Accept);
        // Duplicate response for the same shown event must not overrun
        stats.record_response(SuggestionKind::Capture, &tags, SuggestionResponse::Accept);

        let p = stats.patterns.get("bug-fix").unwrap();
        assert_eq!(p.shown, 1);
        assert_eq!(p.accepted, 1);
    }

    #[test]
    fn test_suppress_more_doubles_multiplier() {
        let mut stats = NotificationStats::default();
        assert_eq!(stats.cooldown_multiplier, 1.0);
        stats.record_response(SuggestionKind::Tip, &[], SuggestionResponse::SuppressMore);
        assert_eq!(stats.cooldown_multiplier, 2.0);
        stats.record_response(SuggestionKind::Tip, &[], SuggestionResponse::SuppressMore);
        assert_eq!(stats.cooldown_multiplier, 4.0);
    }

    #[test]
    fn test_none_response_changes_no_counters() {
        let mut stats = NotificationStats::default();
        stats.record_response(SuggestionKind::Capture, &[], SuggestionResponse::None);
        assert!(stats.kinds.is_empty());
        assert_eq!(stats.acceptance_rate(SuggestionKind::Capture), 0.5);
    }

    #[test]
    fn test_bypass_event_leaves_cooldowns_alone() {
        let mut stats = NotificationStats::default();
        let now = Utc::now();
        stats.record_bypass_event(now);
        assert_eq!(stats.last_event, Some(now));
        assert_eq!(stats.last_any_shown, None);
        assert!(stats.last_shown.is_empty());
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let conn = setup_test_db();
        let stats = NotificationStats::load_sync(&conn);
        assert_eq!(stats.cooldown_multiplier, 1.0);
        assert!(stats.kinds.is_empty());
    }

    #[test]
    fn test_load_corrupt_returns_defaults() {
        let conn = setup_test_db();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, 'not json', '')",
            [STATS_KEY],
        )
        .unwrap();
        let stats = NotificationStats::load_sync(&conn);
        assert!(stats.kinds.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let conn = setup_test_db();
        let now = Utc::now();
        let mut stats = NotificationStats::default();
        stats.record_shown(SuggestionKind::Draft, &["refactor".to_string()], now);
        stats.record_response(
            SuggestionKind::Draft,
            &["refactor".to_string()],
            SuggestionResponse::Accept,
        );
        stats.save_sync(&conn, now).unwrap();

        let loaded = NotificationStats::load_sync(&conn);
        assert_eq!(loaded.kinds.get("draft").unwrap().accepted, 1);
        assert_eq!(loaded.patterns.get("refactor").unwrap().shown, 1);
        assert!(loaded.last_any_shown.is_some());
    }
}
