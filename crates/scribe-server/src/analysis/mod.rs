// crates/scribe-server/src/analysis/
// Change significance analysis: shallow pattern detection + structural
// complexity deltas, composed into a 0-100 significance score.

pub mod complexity;
pub mod patterns;
mod types;

pub use complexity::structural_complexity;
pub use patterns::{PatternTag, detect_patterns, resolve_category};
pub use types::{ChangeAnalysis, ChangeCategory, FileMeta, SuggestedRegion};

use chrono::{DateTime, Duration, Utc};
use scribe_types::EditedRange;

use crate::activity::{ActivityStateTracker, STATE_RETENTION_HOURS};

/// Score at or above which a change is worth surfacing
pub const INTERESTING_THRESHOLD: u32 = 60;
/// Upper bound for the composite score
pub const MAX_SCORE: u32 = 100;
/// Lines-changed count above which size contributes to the score
pub const LINES_CHANGED_THRESHOLD: u32 = 20;
/// Cap on the lines-changed contribution
pub const LINES_CHANGED_BONUS_CAP: u32 = 50;
/// Complexity delta below which a change counts as meaningful simplification
pub const SIMPLIFICATION_DELTA: i32 = -5;
/// Complexity delta above which a change counts as meaningful growth
pub const GROWTH_DELTA: i32 = 10;
const SIMPLIFICATION_BONUS: u32 = 30;
const GROWTH_BONUS: u32 = 20;
/// Context lines added on each side when scoring a candidate region
pub const REGION_CONTEXT_LINES: u32 = 3;

/// File extensions treated as configuration by the path heuristic
const CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "env", "conf", "properties",
];

/// File extensions treated as documentation
const DOC_EXTENSIONS: &[&str] = &["md", "rst", "adoc", "txt"];

/// Stateful analyzer: owns the per-file activity tracker so complexity
/// deltas stay internal to the analysis step.
#[derive(Debug, Default)]
pub struct ChangeSignificanceAnalyzer {
    tracker: ActivityStateTracker,
}

impl ChangeSignificanceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a saved document. Updates the per-file state and scores the
    /// change against the previous analysis of the same file.
    pub fn analyze(
        &mut self,
        meta: &FileMeta,
        full_text: &str,
        edited_ranges: &[EditedRange],
        now: DateTime<Utc>,
    ) -> ChangeAnalysis {
        let delta = self.tracker.record_and_diff(&meta.path, full_text, now);
        analyze_change(meta, full_text, edited_ranges, delta)
    }

    /// Drop per-file state not refreshed within the retention window.
    pub fn evict_stale(&mut self, now: DateTime<Utc>) -> usize {
        self.tracker
            .evict_stale(now, Duration::hours(STATE_RETENTION_HOURS))
    }

    pub fn tracked_files(&self) -> usize {
        self.tracker.len()
    }
}

/// Pure scoring function: deterministic for identical inputs.
///
/// Never fails; an empty diff yields a zero, uninteresting verdict.
pub fn analyze_change(
    meta: &FileMeta,
    full_text: &str,
    edited_ranges: &[EditedRange],
    complexity_delta: i32,
) -> ChangeAnalysis {
    let lines: Vec<&str> = full_text.lines().collect();
    let edited = edited_text(&lines, edited_ranges);
    if edited.trim().is_empty() {
        return ChangeAnalysis::uninteresting(complexity_delta);
    }

    let mut matched = detect_patterns(&edited);
    if is_config_file(&meta.path) && !matched.contains(&PatternTag::ConfigFile) {
        matched.push(PatternTag::ConfigFile);
    }

    let mut score: u32 = matched.iter().map(|t| t.score_bonus()).sum();

    if complexity_delta < SIMPLIFICATION_DELTA {
        score += SIMPLIFICATION_BONUS;
    } else if complexity_delta > GROWTH_DELTA {
        score += GROWTH_BONUS;
    }

    let lines_changed: u32 = edited_ranges.iter().map(|r| r.line_count()).sum();
    if lines_changed > LINES_CHANGED_THRESHOLD {
        score += (2 * lines_changed).min(LINES_CHANGED_BONUS_CAP);
    }

    let score = score.min(MAX_SCORE);
    let is_interesting = score >= INTERESTING_THRESHOLD;

    let category = resolve_category(&matched).unwrap_or(if is_doc_file(&meta.path) {
        ChangeCategory::Docs
    } else {
        ChangeCategory::Feature
    });

    let suggested_region = if is_interesting {
        suggest_region(&lines, edited_ranges)
    } else {
        None
    };

    ChangeAnalysis {
        is_interesting,
        score,
        category,
        matched_patterns: matched,
        complexity_delta,
        suggested_region,
    }
}

/// Score a commit message with the same pattern table (tag bonuses only).
pub fn analyze_commit_message(message: &str) -> ChangeAnalysis {
    let matched = detect_patterns(message);
    let score: u32 = matched
        .iter()
        .map(|t| t.score_bonus())
        .sum::<u32>()
        .min(MAX_SCORE);

    ChangeAnalysis {
        is_interesting: score >= INTERESTING_THRESHOLD,
        score,
        category: resolve_category(&matched).unwrap_or(ChangeCategory::Feature),
        matched_patterns: matched,
        complexity_delta: 0,
        suggested_region: None,
    }
}

/// Join the lines covered by the edited ranges (1-based, inclusive).
fn edited_text(lines: &[&str], ranges: &[EditedRange]) -> String {
    let mut out = Vec::new();
    for range in ranges {
        let start = range.start_line.max(1) as usize;
        let end = (range.end_line as usize).min(lines.len());
        if start > end {
            continue;
        }
        out.extend_from_slice(&lines[start - 1..end]);
    }
    out.join("\n")
}

/// Pick the most interesting edited region: expand each range by the context
/// margin, re-score the sub-region alone, keep the best. Ties keep the
/// first-seen region.
fn suggest_region(lines: &[&str], ranges: &[EditedRange]) -> Option<SuggestedRegion> {
    let mut best: Option<(u32, SuggestedRegion)> = None;

    for range in ranges {
        let start = range.start_line.saturating_sub(REGION_CONTEXT_LINES).max(1);
        let end = range
            .end_line
            .saturating_add(REGION_CONTEXT_LINES)
            .min(lines.len() as u32);
        if start > end || lines.is_empty() {
            continue;
        }

        let slice = lines[start as usize - 1..end as usize].join("\n");
        let tags = detect_patterns(&slice);
        let complexity = structural_complexity(&slice);
        let score = tags.len() as u32 * 20 + complexity * 2;
        if score == 0 {
            continue;
        }

        let reason = if tags.is_empty() {
            format!("structurally dense (complexity {})", complexity)
        } else {
            let names: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
            format!("matches {}", names.join(", "))
        };

        let candidate = SuggestedRegion {
            start_line: start,
            end_line: end,
            reason,
        };
        match &best {
            Some((best_score, _)) if score <= *best_score => {}
            _ => best = Some((score, candidate)),
        }
    }

    best.map(|(_, region)| region)
}

/// Configuration file heuristic by extension and file name
pub fn is_config_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let name = lower.rsplit(['/', '\\']).next().unwrap_or(&lower);

    if name.starts_with('.') {
        return true;
    }
    if name.contains("config") {
        return true;
    }
    name.rsplit_once('.')
        .map(|(_, ext)| CONFIG_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Documentation file heuristic by extension
fn is_doc_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower
        .rsplit_once('.')
        .map(|(_, ext)| DOC_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(path: &str) -> FileMeta {
        FileMeta::new(path, Some("typescript".to_string()))
    }

    fn whole_file(text: &str) -> Vec<EditedRange> {
        vec![EditedRange::new(1, text.lines().count().max(1) as u32)]
    }

    #[test]
    fn test_empty_diff_is_uninteresting() {
        let analysis = analyze_change(&meta("src/a.ts"), "", &[], 0);
        assert!(!analysis.is_interesting);
        assert_eq!(analysis.score, 0);
        assert!(analysis.matched_patterns.is_empty());
        assert!(analysis.suggested_region.is_none());
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let text = "try { save() } catch (e) { throw new Error('fail') }";
        let ranges = whole_file(text);
        let a = analyze_change(&meta("src/a.ts"), text, &ranges, 3);
        let b = analyze_change(&meta("src/a.ts"), text, &ranges, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_is_clamped_to_100() {
        let text = "fixed the auth token bug: sanitize password input, \
                    refactored the cache algorithm, added assert_eq!(a, b)";
        let analysis = analyze_change(&meta("src/a.ts"), text, &whole_file(text), 20);
        assert_eq!(analysis.score, 100);
        assert!(analysis.is_interesting);
    }

    #[test]
    fn test_interesting_iff_score_at_threshold() {
        // error-handling alone contributes 70 -> interesting
        let text = "try { run() } catch (e) { recover(e) }";
        let hot = analyze_change(&meta("src/a.ts"), text, &whole_file(text), 0);
        assert!(hot.score >= INTERESTING_THRESHOLD);
        assert!(hot.is_interesting);

        // test-addition alone contributes 50 -> not interesting
        let text = "assert_eq!(result, 42)";
        let cold = analyze_change(&meta("src/a.ts"), text, &whole_file(text), 0);
        assert_eq!(cold.score, 50);
        assert!(!cold.is_interesting);
    }

    #[test]
    fn test_error_handling_category_beats_refactor() {
        let text = "refactor: try { } catch (e) { } and throw new Error('x')";
        let analysis = analyze_change(&meta("src/a.ts"), text, &whole_file(text), 0);
        assert!(
            analysis
                .matched_patterns
                .contains(&PatternTag::ErrorHandling)
        );
        assert!(analysis.matched_patterns.contains(&PatternTag::Refactor));
        assert_eq!(analysis.category, ChangeCategory::Fix);
    }

    #[test]
    fn test_config_file_bonus() {
        let text = "\"workers\": 4,\n\"timeout\": 30";
        let analysis = analyze_change(&meta("package.json"), text, &whole_file(text), 0);
        assert!(analysis.matched_patterns.contains(&PatternTag::ConfigFile));
        assert_eq!(analysis.score, 40);
        assert!(!analysis.is_interesting);
    }

    #[test]
    fn test_large_change_bonus() {
        // 25 neutral lines in a config file: 40 (config) + min(2*25, 50) = 90
        let text = (0..25)
            .map(|i| format!("key{} = {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let analysis = analyze_change(&meta("settings.toml"), &text, &whole_file(&text), 0);
        assert_eq!(analysis.score, 90);
        assert!(analysis.is_interesting);
    }

    #[test]
    fn test_simplification_and_growth_bonuses() {
        let text = "assert_eq!(result, 42)"; // 50 base from test-addition
        let simplified = analyze_change(&meta("a.ts"), text, &whole_file(text), -6);
        assert_eq!(simplified.score, 80);

        let grown = analyze_change(&meta("a.ts"), text, &whole_file(text), 11);
        assert_eq!(grown.score, 70);

        let small_delta = analyze_change(&meta("a.ts"), text, &whole_file(text), -5);
        assert_eq!(small_delta.score, 50);
    }

    #[test]
    fn test_region_targets_pattern_match() {
        let mut lines: Vec<String> = (0..30).map(|i| format!("let x{} = {}", i, i)).collect();
        lines[20] = "try { parse() } catch (e) { throw e }".to_string();
        let text = lines.join("\n");

        let ranges = vec![EditedRange::new(2, 4), EditedRange::new(19, 23)];
        let analysis = analyze_change(&meta("src/a.ts"), &text, &ranges, 0);
        assert!(analysis.is_interesting, "score = {}", analysis.score);

        let region = analysis.suggested_region.expect("region expected");
        assert!(region.start_line <= 21 && region.end_line >= 21);
        assert!(region.reason.contains("error-handling"));
    }

    #[test]
    fn test_doc_file_defaults_to_docs_category() {
        let text = "added a section describing the release steps";
        let analysis = analyze_change(&meta("README.md"), text, &whole_file(text), 0);
        assert_eq!(analysis.category, ChangeCategory::Docs);
    }

    #[test]
    fn test_commit_message_scoring() {
        let hot = analyze_commit_message("fix: expire auth tokens after rotation");
        assert!(hot.is_interesting);
        assert_eq!(hot.score, 100); // bug-fix 85 + security 90, clamped
        assert_eq!(hot.category, ChangeCategory::Security);

        let cold = analyze_commit_message("bump version to 1.2.3");
        assert!(!cold.is_interesting);
        assert_eq!(cold.score, 0);
    }

    #[test]
    fn test_is_config_file_heuristics() {
        assert!(is_config_file("package.json"));
        assert!(is_config_file("deploy/settings.yaml"));
        assert!(is_config_file("webpack.config.js"));
        assert!(is_config_file(".eslintrc"));
        assert!(!is_config_file("src/main.rs"));
        assert!(!is_config_file("notes.txt"));
    }

    #[test]
    fn test_analyzer_wires_delta_through_tracker() {
        let mut analyzer = ChangeSignificanceAnalyzer::new();
        let now = Utc::now();
        let meta = meta("src/a.ts");

        let simple = "let x = 1";
        let first = analyzer.analyze(&meta, simple, &whole_file(simple), now);
        assert_eq!(first.complexity_delta, 0);

        let complex =
            "if (a) {\n  for (i of xs) {\n    if (b && c) { run() }\n  }\n}";
        let second = analyzer.analyze(&meta, complex, &whole_file(complex), now);
        assert!(second.complexity_delta > 0);
        assert_eq!(analyzer.tracked_files(), 1);
    }
}
