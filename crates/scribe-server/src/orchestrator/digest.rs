// orchestrator/digest.rs
// Low-frequency aggregate checks: weekly digest window, draft readiness,
// theme detection and aggregate quality labelling.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use std::collections::HashMap;

use crate::db::CaptureRow;
use scribe_types::DraftQuality;

/// Qualifying items required before the weekly digest fires
pub const DIGEST_MIN_ITEMS: i64 = 3;
/// Uncategorized captures required before draft readiness fires
pub const DRAFT_READY_MIN_ITEMS: i64 = 5;
/// Local hour (0-23) of the one-hour digest window on the configured weekday
pub const DIGEST_WINDOW_HOUR: u32 = 16;
/// Minimum gap between digests, so one window never fires twice
pub const MIN_DIGEST_GAP_DAYS: i64 = 6;
/// Maximum number of themes reported
pub const MAX_THEMES: usize = 3;
/// A theme needs at least this many occurrences
pub const MIN_THEME_COUNT: usize = 2;

/// Notes at or above this length count toward item quality
const GOOD_NOTES_LEN: usize = 80;

/// Whether the one-hour digest window is open: right weekday, right hour,
/// and the previous digest was at least a week ago.
pub fn digest_window_open(
    now: DateTime<Utc>,
    weekday: Weekday,
    last_digest: Option<DateTime<Utc>>,
) -> bool {
    if now.weekday() != weekday || now.hour() != DIGEST_WINDOW_HOUR {
        return false;
    }
    match last_digest {
        Some(last) => now - last > Duration::days(MIN_DIGEST_GAP_DAYS),
        None => true,
    }
}

/// Aggregate quality of accumulated captures.
///
/// Each item earns a point for substantial notes, one for structural
/// context, one for attached code; the label follows the average.
pub fn draft_quality(items: &[CaptureRow]) -> DraftQuality {
    if items.is_empty() {
        return DraftQuality::Low;
    }

    let total: u32 = items
        .iter()
        .map(|item| {
            let mut points = 0;
            if item.notes.len() >= GOOD_NOTES_LEN {
                points += 1;
            }
            if item.has_context {
                points += 1;
            }
            if item.has_code {
                points += 1;
            }
            points
        })
        .sum();

    let average = total as f64 / items.len() as f64;
    if average >= 2.0 {
        DraftQuality::High
    } else if average >= 1.0 {
        DraftQuality::Medium
    } else {
        DraftQuality::Low
    }
}

/// Up to three most frequent language/tag themes across captures.
/// Ties break alphabetically so the output is deterministic.
pub fn detect_themes(items: &[CaptureRow]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        if let Some(language) = item.language.as_deref() {
            *counts.entry(language).or_default() += 1;
        }
        for tag in &item.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= MIN_THEME_COUNT)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(MAX_THEMES)
        .map(|(theme, _)| theme.to_string())
        .collect()
}
