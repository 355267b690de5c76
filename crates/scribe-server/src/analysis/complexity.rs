// analysis/complexity.rs
// Structural complexity estimate from shallow text scanning.
//
// Cyclomatic-style: branches, loops, boolean operators, exception handling,
// ternaries, call density and nesting depth. No parsing, no AST.

use regex::Regex;
use std::sync::LazyLock;

/// Weight per call expression
const CALL_WEIGHT: f64 = 0.5;
/// Cap on the total call-expression contribution
const CALL_WEIGHT_CAP: f64 = 10.0;
/// Weight per level of maximum nesting depth
const NESTING_WEIGHT: f64 = 2.0;

static BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:else\s+if|else|if|switch|case)\b").expect("valid regex"));

static LOOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:for|while|do|foreach|loop)\b").expect("valid regex"));

static ITERATION_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?:forEach|map|filter|reduce|each|iter)\s*\(").expect("valid regex")
});

static EXCEPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:try|catch|finally)\b").expect("valid regex"));

static TERNARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?[^:\n?]*:").expect("valid regex"));

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid regex"));

/// Keywords that look like call expressions but aren't
const NON_CALL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "catch", "return", "match", "fn",
    "function", "def", "new", "try", "loop", "await",
];

/// Estimate the structural complexity of a piece of source text.
///
/// Starts at 1 for any non-empty text; whitespace-only input scores 0.
pub fn structural_complexity(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 0;
    }

    let mut score = 1.0_f64;

    score += BRANCH_RE.find_iter(text).count() as f64;
    score += LOOP_RE.find_iter(text).count() as f64;
    score += ITERATION_CALL_RE.find_iter(text).count() as f64;
    score += (text.matches("&&").count() + text.matches("||").count()) as f64;
    score += EXCEPTION_RE.find_iter(text).count() as f64;
    score += TERNARY_RE.find_iter(text).count() as f64;

    let calls = CALL_RE
        .captures_iter(text)
        .filter(|c| {
            c.get(1)
                .map(|m| !NON_CALL_KEYWORDS.contains(&m.as_str()))
                .unwrap_or(false)
        })
        .count();
    score += (calls as f64 * CALL_WEIGHT).min(CALL_WEIGHT_CAP);

    score += NESTING_WEIGHT * max_nesting_depth(text) as f64;

    score.round() as u32
}

/// Maximum block nesting depth, tracked by brace balance.
/// String literals and comments are not special-cased.
fn max_nesting_depth(text: &str) -> u32 {
    let mut depth: u32 = 0;
    let mut max_depth: u32 = 0;
    for ch in text.chars() {
        match ch {
            '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max_depth
}
