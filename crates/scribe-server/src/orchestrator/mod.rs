// crates/scribe-server/src/orchestrator/
// Root of the proactive engine. Routes activity signals (save, commit,
// tick) through the analyzer and the adaptive gate, tracks session state
// and burst suppression, and runs the low-frequency aggregate checks.

pub mod digest;
pub mod session;

pub use session::SessionState;

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::analysis::{ChangeAnalysis, ChangeSignificanceAnalyzer, FileMeta, analyze_commit_message};
use crate::config::EngineSettings;
use crate::db::{self, DatabasePool, NewCapture};
use crate::gate::{AdaptiveNotificationGate, GateDecision, NotificationStats};
use crate::notify::{Notifier, new_request};
use crate::utils::{first_line, truncate};
use scribe_types::{ActivitySignal, EditedRange, SuggestionKind, SuggestionResponse};

use self::digest::{DIGEST_MIN_ITEMS, DRAFT_READY_MIN_ITEMS, detect_themes, digest_window_open, draft_quality};
use self::session::milestone_crossed;

/// Saves of the same file closer together than this count as one burst
pub const BURST_WINDOW_SECS: i64 = 5;
/// Rapid saves at which analysis starts being suppressed
const BURST_SUPPRESS_AFTER: u32 = 2;
/// How long an unanswered capture payload is kept for a late response
const PENDING_CAPTURE_RETENTION_HOURS: i64 = 24;
/// Recent captures examined by the draft-readiness check
const DRAFT_SAMPLE_SIZE: i64 = 25;

/// Per-file burst tracking
#[derive(Debug, Clone, Copy)]
struct BurstState {
    last_save_at: DateTime<Utc>,
    rapid_saves: u32,
}

/// Register a save and decide whether to suppress its analysis.
///
/// The second save inside the window still analyzes; from the third rapid
/// save on, analysis is suppressed. A gap above the window resets the
/// counter.
fn register_burst(
    bursts: &mut HashMap<String, BurstState>,
    path: &str,
    now: DateTime<Utc>,
) -> bool {
    match bursts.get_mut(path) {
        Some(burst) => {
            if now - burst.last_save_at <= Duration::seconds(BURST_WINDOW_SECS) {
                burst.rapid_saves += 1;
            } else {
                burst.rapid_saves = 0;
            }
            burst.last_save_at = now;
            burst.rapid_saves >= BURST_SUPPRESS_AFTER
        }
        None => {
            bursts.insert(
                path.to_string(),
                BurstState {
                    last_save_at: now,
                    rapid_saves: 0,
                },
            );
            false
        }
    }
}

/// A suggestion ready for the gate
struct PendingSuggestion {
    kind: SuggestionKind,
    title: String,
    body: String,
    reason: String,
    tags: Vec<String>,
    /// Capture created if the user accepts
    capture: Option<NewCapture>,
}

/// Mutable engine state, guarded by one async mutex. Gate checks and state
/// updates happen inside a single lock hold, before any suspending call.
struct Inner {
    analyzer: ChangeSignificanceAnalyzer,
    gate: AdaptiveNotificationGate,
    session: SessionState,
    bursts: HashMap<String, BurstState>,
    in_flight: HashSet<SuggestionKind>,
    /// Capture payloads waiting for an out-of-band response, by request id
    pending_captures: HashMap<String, (NewCapture, DateTime<Utc>)>,
}

/// The proactive engine root
pub struct ProactiveOrchestrator {
    pool: Arc<DatabasePool>,
    notifier: Arc<dyn Notifier>,
    settings: EngineSettings,
    inner: Mutex<Inner>,
}

impl ProactiveOrchestrator {
    /// Build the engine, loading persisted stats. A failed load degrades to
    /// defaults - never fails hard on missing data.
    pub async fn new(
        pool: Arc<DatabasePool>,
        notifier: Arc<dyn Notifier>,
        settings: EngineSettings,
    ) -> Self {
        let stats = pool
            .try_interact("load notification stats", |conn| {
                Ok(NotificationStats::load_sync(conn))
            })
            .await
            .unwrap_or_default();

        let gate = AdaptiveNotificationGate::new(settings.base_cooldown, stats);

        Self {
            pool,
            notifier,
            settings,
            inner: Mutex::new(Inner {
                analyzer: ChangeSignificanceAnalyzer::new(),
                gate,
                session: SessionState::new(Utc::now()),
                bursts: HashMap::new(),
                in_flight: HashSet::new(),
                pending_captures: HashMap::new(),
            }),
        }
    }

    /// Entry point for host activity signals
    pub async fn on_signal(&self, signal: ActivitySignal) {
        if !self.settings.enabled {
            return;
        }
        let now = Utc::now();
        match signal {
            ActivitySignal::Save {
                path,
                language,
                text,
                edited_ranges,
            } => self.handle_save(path, language, text, edited_ranges, now).await,
            ActivitySignal::Commit { hash, message } => {
                self.handle_commit(hash, message, now).await
            }
            ActivitySignal::Tick => self.handle_tick(now).await,
        }
    }

    /// Entry point for host-driven responses, correlated by request id
    pub async fn on_response(&self, request_id: &str, response: SuggestionResponse) {
        let id = request_id.to_string();
        let row = self
            .pool
            .try_interact("look up suggestion", move |conn| {
                db::get_suggestion_sync(conn, &id)
            })
            .await
            .flatten();

        let Some(row) = row else {
            debug!(request_id, "response for unknown suggestion");
            return;
        };
        if row.user_response.is_some() {
            debug!(request_id, "suggestion already resolved");
            return;
        }
        let Ok(kind) = row.kind.parse::<SuggestionKind>() else {
            warn!(kind = %row.kind, "unparseable suggestion kind in audit log");
            return;
        };

        self.apply_response(request_id, kind, &row.tags, response, Utc::now())
            .await;
    }

    /// Reset session counters. Called when the host signals a new session;
    /// never invoked implicitly.
    pub async fn reset_session(&self) {
        let mut inner = self.inner.lock().await;
        inner.session.reset(Utc::now());
        info!("session reset");
    }

    // ------------------------------------------------------------------
    // Signal handlers
    // ------------------------------------------------------------------

    async fn handle_save(
        &self,
        path: String,
        language: Option<String>,
        text: String,
        edited_ranges: Vec<EditedRange>,
        now: DateTime<Utc>,
    ) {
        // Burst check and tracker update are synchronous under the lock, so
        // no two analyses of the same file can interleave.
        let analysis = {
            let mut inner = self.inner.lock().await;
            if register_burst(&mut inner.bursts, &path, now) {
                debug!(%path, "rapid save burst, suppressing analysis");
                return;
            }
            let meta = FileMeta::new(path.clone(), language.clone());
            inner.analyzer.analyze(&meta, &text, &edited_ranges, now)
        };

        if !analysis.is_interesting {
            debug!(%path, score = analysis.score, "change below threshold");
            return;
        }

        let suggestion = save_suggestion(&path, language, &analysis);
        self.surface(suggestion, now).await;
    }

    async fn handle_commit(&self, hash: String, message: String, now: DateTime<Utc>) {
        let analysis = analyze_commit_message(&message);
        if !analysis.is_interesting {
            debug!(%hash, score = analysis.score, "commit below threshold");
            return;
        }

        let summary = first_line(&message).to_string();
        let tags: Vec<String> = analysis
            .matched_patterns
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();

        let suggestion = PendingSuggestion {
            kind: SuggestionKind::Capture,
            title: "Capture this commit?".to_string(),
            body: format!("\"{}\" looks worth a journal entry.", truncate(&summary, 120)),
            reason: "commit".to_string(),
            tags: tags.clone(),
            capture: Some(NewCapture {
                title: summary,
                notes: format!("commit {}\n\n{}", hash, message),
                category: None,
                language: None,
                tags,
                has_context: false,
                has_code: false,
                source: "commit".to_string(),
            }),
        };
        self.surface(suggestion, now).await;
    }

    /// Hourly tick: state eviction plus the aggregate checks
    async fn handle_tick(&self, now: DateTime<Utc>) {
        {
            let mut inner = self.inner.lock().await;
            let evicted = inner.analyzer.evict_stale(now);
            if evicted > 0 {
                debug!(evicted, "evicted stale document state");
            }
            let cutoff = now - Duration::hours(PENDING_CAPTURE_RETENTION_HOURS);
            inner.pending_captures.retain(|_, (_, at)| *at > cutoff);
        }

        self.check_weekly_digest(now).await;
        self.check_draft_readiness(now).await;
    }

    // ------------------------------------------------------------------
    // Aggregate checks
    // ------------------------------------------------------------------

    async fn check_weekly_digest(&self, now: DateTime<Utc>) {
        let last_digest = {
            let inner = self.inner.lock().await;
            inner.gate.stats.last_digest_at
        };
        if !digest_window_open(now, self.settings.digest_weekday, last_digest) {
            return;
        }

        // Collaborator failure means "skip this check this cycle"
        let week_ago = now - Duration::days(7);
        let Some(count) = self
            .pool
            .try_interact("digest item count", move |conn| {
                db::count_captures_since_sync(conn, week_ago)
            })
            .await
        else {
            return;
        };
        if count < DIGEST_MIN_ITEMS {
            debug!(count, "not enough items for a weekly digest");
            return;
        }

        let request = new_request(
            SuggestionKind::WeeklyReview,
            "Weekly review time",
            format!("{} captures this week are waiting for a look.", count),
            "weekly-digest",
            Vec::new(),
        );

        // Bypass path: no gate, but the digest still counts as a
        // notification event and is recorded for learning.
        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.gate.stats.last_digest_at = Some(now);
            inner.gate.record_bypass_event(now);
            inner.gate.stats.clone()
        };
        self.flush_stats(snapshot, now).await;
        self.log_shown(&request, now).await;

        info!("weekly digest fired");
        let response = self.present(&request).await;
        self.apply_response(&request.id, request.kind, &request.tags, response, now)
            .await;
    }

    async fn check_draft_readiness(&self, now: DateTime<Utc>) {
        let Some(uncategorized) = self
            .pool
            .try_interact("draft readiness count", db::count_uncategorized_sync)
            .await
        else {
            return;
        };
        if uncategorized < DRAFT_READY_MIN_ITEMS {
            return;
        }

        let recent = self
            .pool
            .try_interact("recent captures", |conn| {
                db::recent_captures_sync(conn, DRAFT_SAMPLE_SIZE)
            })
            .await
            .unwrap_or_default();

        let quality = draft_quality(&recent);
        let themes = detect_themes(&recent);
        let theme_note = if themes.is_empty() {
            String::new()
        } else {
            format!(" Recurring themes: {}.", themes.join(", "))
        };

        let suggestion = PendingSuggestion {
            kind: SuggestionKind::Draft,
            title: "Enough material for a draft".to_string(),
            body: format!(
                "{} uncategorized captures ({} quality).{}",
                uncategorized,
                quality.as_str(),
                theme_note
            ),
            reason: "draft-ready".to_string(),
            tags: Vec::new(),
            capture: None,
        };
        self.surface(suggestion, now).await;
    }

    // ------------------------------------------------------------------
    // Surfacing
    // ------------------------------------------------------------------

    /// Run a suggestion through the gate and, if it passes, show it.
    ///
    /// All stats mutations happen before awaiting the notifier, so a crash
    /// mid-display can never leave the counters claiming less than what the
    /// user saw.
    async fn surface(&self, suggestion: PendingSuggestion, now: DateTime<Utc>) {
        let request = new_request(
            suggestion.kind,
            suggestion.title,
            suggestion.body,
            suggestion.reason,
            suggestion.tags,
        );

        let snapshot = {
            let mut inner = self.inner.lock().await;
            if inner.in_flight.contains(&suggestion.kind) {
                debug!(kind = suggestion.kind.as_str(), "suggestion already in flight");
                return;
            }
            let decision =
                inner
                    .gate
                    .evaluate(suggestion.kind, inner.session.suggestions_shown, now);
            if let GateDecision::Suppress(reason) = decision {
                debug!(
                    kind = suggestion.kind.as_str(),
                    reason = reason.as_str(),
                    "suggestion suppressed"
                );
                return;
            }

            inner.gate.record_shown(suggestion.kind, &request.tags, now);
            inner.session.suggestions_shown += 1;
            inner.in_flight.insert(suggestion.kind);
            if let Some(capture) = suggestion.capture {
                inner
                    .pending_captures
                    .insert(request.id.clone(), (capture, now));
            }
            inner.gate.stats.clone()
        };

        self.flush_stats(snapshot, now).await;
        self.log_shown(&request, now).await;

        info!(
            kind = request.kind.as_str(),
            reason = %request.reason,
            "surfacing suggestion"
        );
        let response = self.present(&request).await;

        {
            let mut inner = self.inner.lock().await;
            inner.in_flight.remove(&request.kind);
        }
        self.apply_response(&request.id, request.kind, &request.tags, response, now)
            .await;
    }

    /// Show the request, degrading notifier failures to `None`
    async fn present(&self, request: &scribe_types::SuggestionRequest) -> SuggestionResponse {
        match self.notifier.notify(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(id = %request.id, "notifier failed: {}", e);
                SuggestionResponse::None
            }
        }
    }

    /// Record a terminal response: counters, persistence, capture creation,
    /// milestone detection. A `None` response leaves everything pending.
    async fn apply_response(
        &self,
        request_id: &str,
        kind: SuggestionKind,
        tags: &[String],
        response: SuggestionResponse,
        now: DateTime<Utc>,
    ) {
        if response == SuggestionResponse::None {
            return;
        }

        let (snapshot, capture) = {
            let mut inner = self.inner.lock().await;
            inner.gate.record_response(kind, tags, response);
            let capture = inner
                .pending_captures
                .remove(request_id)
                .map(|(capture, _)| capture);
            (inner.gate.stats.clone(), capture)
        };

        self.flush_stats(snapshot, now).await;

        let id = request_id.to_string();
        let response_str = response.as_str();
        self.pool
            .try_interact_warn("record suggestion response", move |conn| {
                db::record_suggestion_response_sync(conn, &id, response_str, now)
            })
            .await;

        if response == SuggestionResponse::Accept
            && let Some(capture) = capture
        {
            self.record_capture(capture, now).await;
        }
    }

    /// Insert an accepted capture and fire any crossed milestone
    async fn record_capture(&self, capture: NewCapture, now: DateTime<Utc>) {
        let inserted = self
            .pool
            .try_interact_warn("insert capture", move |conn| {
                db::insert_capture_sync(conn, &capture, now)
            })
            .await
            .is_some();
        if !inserted {
            return;
        }

        let milestone = {
            let mut inner = self.inner.lock().await;
            let previous = inner.session.captures_made;
            inner.session.captures_made += 1;
            milestone_crossed(previous, inner.session.captures_made)
        };

        if let Some((threshold, message)) = milestone {
            self.celebrate(threshold, message, now).await;
        }
    }

    /// Milestone celebrations bypass the gate: rare, celebratory, and shown
    /// unconditionally exactly once per threshold crossing.
    async fn celebrate(&self, threshold: u32, message: &str, now: DateTime<Utc>) {
        let request = new_request(
            SuggestionKind::Milestone,
            format!("{} captures", threshold),
            message,
            "milestone",
            Vec::new(),
        );

        let snapshot = {
            let mut inner = self.inner.lock().await;
            inner.gate.record_bypass_event(now);
            inner.gate.stats.clone()
        };
        self.flush_stats(snapshot, now).await;
        self.log_shown(&request, now).await;

        info!(threshold, "capture milestone reached");
        let _ = self.present(&request).await;
    }

    // ------------------------------------------------------------------
    // Persistence helpers (best-effort: failures degrade, never propagate)
    // ------------------------------------------------------------------

    async fn flush_stats(&self, snapshot: NotificationStats, now: DateTime<Utc>) {
        self.pool
            .try_interact_warn("flush notification stats", move |conn| {
                snapshot.save_sync(conn, now)
            })
            .await;
    }

    async fn log_shown(&self, request: &scribe_types::SuggestionRequest, now: DateTime<Utc>) {
        let id = request.id.clone();
        let kind = request.kind.as_str();
        let reason = request.reason.clone();
        let tags = request.tags.clone();
        self.pool
            .try_interact_warn("log suggestion", move |conn| {
                db::log_suggestion_sync(conn, &id, kind, &reason, &tags, now)
            })
            .await;
    }
}

/// Build the capture suggestion for an interesting save
fn save_suggestion(
    path: &str,
    language: Option<String>,
    analysis: &ChangeAnalysis,
) -> PendingSuggestion {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let tags: Vec<String> = analysis
        .matched_patterns
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();

    let region_note = analysis
        .suggested_region
        .as_ref()
        .map(|r| format!("Lines {}-{}: {}.", r.start_line, r.end_line, r.reason))
        .unwrap_or_default();

    let title = format!(
        "Notable {} change in {}",
        analysis.category.as_str(),
        file_name
    );
    let body = format!(
        "Significance {}/100. {}",
        analysis.score,
        if region_note.is_empty() {
            "Worth a quick journal entry?".to_string()
        } else {
            region_note.clone()
        }
    );

    PendingSuggestion {
        kind: SuggestionKind::Capture,
        title: title.clone(),
        body,
        reason: "save".to_string(),
        tags: tags.clone(),
        capture: Some(NewCapture {
            title,
            notes: region_note,
            category: None,
            language,
            tags,
            has_context: analysis.suggested_region.is_some(),
            has_code: true,
            source: "save".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::test_support::ScriptedNotifier;
    use chrono::TimeZone;

    const INTERESTING_TEXT: &str =
        "try { parse(input) } catch (e) { throw new Error('sanitize the token first') }";

    fn settings() -> EngineSettings {
        EngineSettings::default()
    }

    async fn engine(
        responses: Vec<SuggestionResponse>,
    ) -> (ProactiveOrchestrator, Arc<ScriptedNotifier>, Arc<DatabasePool>) {
        let pool = Arc::new(DatabasePool::open_in_memory().await.unwrap());
        let notifier = ScriptedNotifier::new(responses);
        let orchestrator =
            ProactiveOrchestrator::new(pool.clone(), notifier.clone(), settings()).await;
        (orchestrator, notifier, pool)
    }

    fn whole_file(text: &str) -> Vec<EditedRange> {
        vec![EditedRange::new(1, text.lines().count().max(1) as u32)]
    }

    // ------------------------------------------------------------------
    // Burst suppression
    // ------------------------------------------------------------------

    #[test]
    fn test_burst_third_rapid_save_suppressed() {
        let mut bursts = HashMap::new();
        let t0 = Utc::now();
        assert!(!register_burst(&mut bursts, "a.rs", t0));
        assert!(!register_burst(&mut bursts, "a.rs", t0 + Duration::seconds(2)));
        assert!(register_burst(&mut bursts, "a.rs", t0 + Duration::seconds(4)));
    }

    #[test]
    fn test_burst_resets_after_gap() {
        let mut bursts = HashMap::new();
        let t0 = Utc::now();
        register_burst(&mut bursts, "a.rs", t0);
        register_burst(&mut bursts, "a.rs", t0 + Duration::seconds(2));
        // Gap above the window resets the counter
        assert!(!register_burst(&mut bursts, "a.rs", t0 + Duration::seconds(12)));
        assert!(!register_burst(&mut bursts, "a.rs", t0 + Duration::seconds(14)));
        assert!(register_burst(&mut bursts, "a.rs", t0 + Duration::seconds(15)));
    }

    #[test]
    fn test_burst_is_per_file() {
        let mut bursts = HashMap::new();
        let t0 = Utc::now();
        register_burst(&mut bursts, "a.rs", t0);
        register_burst(&mut bursts, "a.rs", t0 + Duration::seconds(1));
        assert!(!register_burst(&mut bursts, "b.rs", t0 + Duration::seconds(2)));
    }

    // ------------------------------------------------------------------
    // Save -> suggestion -> capture flow
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_interesting_save_surfaces_and_accept_creates_capture() {
        let (orchestrator, notifier, pool) = engine(vec![SuggestionResponse::Accept]).await;
        let now = Utc::now();

        orchestrator
            .handle_save(
                "src/auth.ts".to_string(),
                Some("typescript".to_string()),
                INTERESTING_TEXT.to_string(),
                whole_file(INTERESTING_TEXT),
                now,
            )
            .await;

        let seen = notifier.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, SuggestionKind::Capture);
        assert_eq!(seen[0].reason, "save");
        assert!(seen[0].tags.contains(&"error-handling".to_string()));

        let captures = pool
            .try_interact("count", |conn| {
                db::count_captures_since_sync(conn, Utc::now() - Duration::days(1))
            })
            .await
            .unwrap();
        assert_eq!(captures, 1);

        // Stats were flushed with the accept recorded
        let stats = pool
            .try_interact("stats", |conn| Ok(NotificationStats::load_sync(conn)))
            .await
            .unwrap();
        assert_eq!(stats.kinds.get("capture").unwrap().accepted, 1);
        let shown = stats.patterns.get("error-handling").unwrap();
        assert_eq!(shown.shown, 1);
        assert_eq!(shown.accepted, 1);
    }

    #[tokio::test]
    async fn test_boring_save_is_silent() {
        let (orchestrator, notifier, _pool) = engine(vec![]).await;
        let text = "let x = 1";
        orchestrator
            .handle_save(
                "src/x.ts".to_string(),
                None,
                text.to_string(),
                whole_file(text),
                Utc::now(),
            )
            .await;
        assert!(notifier.seen().is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_blocks_second_suggestion() {
        let (orchestrator, notifier, _pool) = engine(vec![
            SuggestionResponse::Dismiss,
            SuggestionResponse::Dismiss,
        ])
        .await;
        let now = Utc::now();

        orchestrator
            .handle_save(
                "src/a.ts".to_string(),
                None,
                INTERESTING_TEXT.to_string(),
                whole_file(INTERESTING_TEXT),
                now,
            )
            .await;
        // Ten seconds later, a different file: still inside the cooldown
        orchestrator
            .handle_save(
                "src/b.ts".to_string(),
                None,
                INTERESTING_TEXT.to_string(),
                whole_file(INTERESTING_TEXT),
                now + Duration::seconds(10),
            )
            .await;

        assert_eq!(notifier.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_engine_ignores_signals() {
        let pool = Arc::new(DatabasePool::open_in_memory().await.unwrap());
        let notifier = ScriptedNotifier::new(vec![SuggestionResponse::Accept]);
        let mut settings = settings();
        settings.enabled = false;
        let orchestrator =
            ProactiveOrchestrator::new(pool, notifier.clone(), settings).await;

        orchestrator
            .on_signal(ActivitySignal::Save {
                path: "src/a.ts".to_string(),
                language: None,
                text: INTERESTING_TEXT.to_string(),
                edited_ranges: whole_file(INTERESTING_TEXT),
            })
            .await;
        assert!(notifier.seen().is_empty());
    }

    // ------------------------------------------------------------------
    // Commits
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_commit_message_can_surface_capture() {
        let (orchestrator, notifier, _pool) = engine(vec![SuggestionResponse::Dismiss]).await;
        orchestrator
            .handle_commit(
                "abc123".to_string(),
                "fix: sanitize auth tokens before logging\n\nlong body".to_string(),
                Utc::now(),
            )
            .await;

        let seen = notifier.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].reason, "commit");
        assert!(seen[0].body.contains("sanitize auth tokens"));
    }

    #[tokio::test]
    async fn test_mundane_commit_is_silent() {
        let (orchestrator, notifier, _pool) = engine(vec![]).await;
        orchestrator
            .handle_commit("abc".to_string(), "bump version".to_string(), Utc::now())
            .await;
        assert!(notifier.seen().is_empty());
    }

    // ------------------------------------------------------------------
    // Milestones
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_fifth_capture_fires_milestone_once() {
        let (orchestrator, notifier, _pool) = engine(vec![]).await;
        {
            let mut inner = orchestrator.inner.lock().await;
            inner.session.captures_made = 4;
        }

        let capture = NewCapture {
            title: "t".to_string(),
            notes: String::new(),
            category: None,
            language: None,
            tags: vec![],
            has_context: false,
            has_code: false,
            source: "save".to_string(),
        };
        orchestrator.record_capture(capture.clone(), Utc::now()).await;

        let seen = notifier.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, SuggestionKind::Milestone);
        assert!(seen[0].title.contains('5'));

        // The sixth capture crosses nothing
        orchestrator.record_capture(capture, Utc::now()).await;
        assert_eq!(notifier.seen().len(), 1);
    }

    // ------------------------------------------------------------------
    // Aggregate checks
    // ------------------------------------------------------------------

    async fn seed_captures(pool: &Arc<DatabasePool>, count: usize, at: DateTime<Utc>) {
        for i in 0..count {
            let capture = NewCapture {
                title: format!("capture {}", i),
                notes: "n".repeat(100),
                category: None,
                language: Some("rust".to_string()),
                tags: vec!["error-handling".to_string()],
                has_context: true,
                has_code: true,
                source: "save".to_string(),
            };
            pool.interact(move |conn| db::insert_capture_sync(conn, &capture, at))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_draft_readiness_fires_with_quality_and_themes() {
        let (orchestrator, notifier, pool) = engine(vec![SuggestionResponse::Dismiss]).await;
        // A Monday morning: the Friday digest window is closed
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        seed_captures(&pool, 5, now - Duration::hours(3)).await;

        orchestrator.handle_tick(now).await;

        let seen = notifier.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, SuggestionKind::Draft);
        assert!(seen[0].body.contains("5 uncategorized"));
        assert!(seen[0].body.contains("high quality"));
        assert!(seen[0].body.contains("rust"));
    }

    #[tokio::test]
    async fn test_draft_readiness_needs_five_items() {
        let (orchestrator, notifier, pool) = engine(vec![]).await;
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        seed_captures(&pool, 4, now - Duration::hours(3)).await;

        orchestrator.handle_tick(now).await;
        assert!(notifier.seen().is_empty());
    }

    #[tokio::test]
    async fn test_weekly_digest_fires_once_in_window() {
        let (orchestrator, notifier, pool) = engine(vec![
            SuggestionResponse::Dismiss,
            SuggestionResponse::Dismiss,
        ])
        .await;
        // 2025-06-06 is a Friday; the window hour is 16
        let now = Utc.with_ymd_and_hms(2025, 6, 6, 16, 10, 0).unwrap();
        seed_captures(&pool, 3, now - Duration::days(2)).await;

        orchestrator.check_weekly_digest(now).await;
        orchestrator.check_weekly_digest(now + Duration::minutes(30)).await;

        let seen = notifier.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, SuggestionKind::WeeklyReview);
    }

    #[tokio::test]
    async fn test_weekly_digest_needs_three_items() {
        let (orchestrator, notifier, pool) = engine(vec![]).await;
        let now = Utc.with_ymd_and_hms(2025, 6, 6, 16, 10, 0).unwrap();
        seed_captures(&pool, 2, now - Duration::days(2)).await;

        orchestrator.check_weekly_digest(now).await;
        assert!(notifier.seen().is_empty());
    }

    #[tokio::test]
    async fn test_tick_evicts_stale_document_state() {
        let (orchestrator, _notifier, _pool) = engine(vec![]).await;
        // A quiet Monday so no aggregate check interferes
        let tick_at = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        {
            let mut inner = orchestrator.inner.lock().await;
            let meta = FileMeta::new("stale.ts", None);
            inner.analyzer.analyze(
                &meta,
                "let x = 1",
                &whole_file("let x = 1"),
                tick_at - Duration::hours(30),
            );
            assert_eq!(inner.analyzer.tracked_files(), 1);
        }

        orchestrator.handle_tick(tick_at).await;

        let inner = orchestrator.inner.lock().await;
        assert_eq!(inner.analyzer.tracked_files(), 0);
    }

    // ------------------------------------------------------------------
    // Out-of-band responses
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_out_of_band_accept_creates_capture() {
        // Notifier answers None (host cannot block); the accept arrives
        // later through on_response, correlated by id.
        let (orchestrator, notifier, pool) = engine(vec![SuggestionResponse::None]).await;
        let now = Utc::now();

        orchestrator
            .handle_save(
                "src/auth.ts".to_string(),
                None,
                INTERESTING_TEXT.to_string(),
                whole_file(INTERESTING_TEXT),
                now,
            )
            .await;

        let seen = notifier.seen();
        assert_eq!(seen.len(), 1);
        let no_captures = pool
            .try_interact("count", |conn| {
                db::count_captures_since_sync(conn, Utc::now() - Duration::days(1))
            })
            .await
            .unwrap();
        assert_eq!(no_captures, 0);

        orchestrator
            .on_response(&seen[0].id, SuggestionResponse::Accept)
            .await;

        let captures = pool
            .try_interact("count", |conn| {
                db::count_captures_since_sync(conn, Utc::now() - Duration::days(1))
            })
            .await
            .unwrap();
        assert_eq!(captures, 1);
    }

    #[tokio::test]
    async fn test_response_for_unknown_id_is_ignored() {
        let (orchestrator, _notifier, pool) = engine(vec![]).await;
        orchestrator
            .on_response("no-such-id", SuggestionResponse::Accept)
            .await;
        let stats = pool
            .try_interact("stats", |conn| Ok(NotificationStats::load_sync(conn)))
            .await
            .unwrap();
        assert!(stats.kinds.is_empty());
    }

    #[tokio::test]
    async fn test_session_cap_blocks_sixth_suggestion() {
        let (orchestrator, notifier, _pool) = engine(vec![]).await;
        {
            let mut inner = orchestrator.inner.lock().await;
            inner.session.suggestions_shown = crate::gate::MAX_SUGGESTIONS_PER_SESSION;
        }
        orchestrator
            .handle_save(
                "src/a.ts".to_string(),
                None,
                INTERESTING_TEXT.to_string(),
                whole_file(INTERESTING_TEXT),
                Utc::now(),
            )
            .await;
        assert!(notifier.seen().is_empty());

        // Session reset clears the cap
        orchestrator.reset_session().await;
        let inner = orchestrator.inner.lock().await;
        assert_eq!(inner.session.suggestions_shown, 0);
    }
}
