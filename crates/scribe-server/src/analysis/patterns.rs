// analysis/patterns.rs
// Heuristic pattern detection over edited text.
//
// A fixed, ordered, table-driven set of independent regex classifiers.
// Classifiers are independent: a change may match several tags at once, and
// detection is a single pass producing a set, not a priority chain. Adding
// or removing a rule never touches the scoring logic.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{EnumIter, IntoStaticStr};

use super::types::ChangeCategory;

/// Category label attached to a change via heuristic matching
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PatternTag {
    BugFix,
    Performance,
    Security,
    ErrorHandling,
    Refactor,
    NewAlgorithm,
    ApiChange,
    TestAddition,
    ConfigFile,
    FrameworkPattern,
    DataAccess,
}

impl PatternTag {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Fixed score bonus contributed when this tag matches
    pub fn score_bonus(&self) -> u32 {
        match self {
            Self::Security => 90,
            Self::BugFix => 85,
            Self::NewAlgorithm => 85,
            Self::Performance => 80,
            Self::ApiChange => 75,
            Self::ErrorHandling => 70,
            Self::Refactor => 65,
            Self::TestAddition => 50,
            Self::FrameworkPattern => 45,
            Self::DataAccess => 45,
            Self::ConfigFile => 40,
        }
    }

    /// Total order used to resolve the change category when several tags
    /// match. Lower value wins.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Security => 0,
            Self::BugFix => 1,
            Self::Performance => 2,
            Self::NewAlgorithm => 3,
            Self::ApiChange => 4,
            Self::ErrorHandling => 5,
            Self::Refactor => 6,
            Self::TestAddition => 7,
            Self::ConfigFile => 8,
            Self::FrameworkPattern => 9,
            Self::DataAccess => 10,
        }
    }

    /// Category this tag resolves to when it wins the priority contest
    pub fn category(&self) -> ChangeCategory {
        match self {
            Self::Security => ChangeCategory::Security,
            Self::BugFix | Self::ErrorHandling => ChangeCategory::Fix,
            Self::Performance => ChangeCategory::Performance,
            Self::Refactor => ChangeCategory::Refactor,
            Self::TestAddition => ChangeCategory::Test,
            Self::NewAlgorithm
            | Self::ApiChange
            | Self::ConfigFile
            | Self::FrameworkPattern
            | Self::DataAccess => ChangeCategory::Feature,
        }
    }
}

/// A single text classifier: tag + detection regex
struct Classifier {
    tag: PatternTag,
    regex: Regex,
}

/// The classifier table, in detection order.
///
/// `ConfigFile` is deliberately absent: it is attached from the file path
/// heuristic (see `is_config_file`), not from text content.
static CLASSIFIERS: LazyLock<Vec<Classifier>> = LazyLock::new(|| {
    let table: &[(PatternTag, &str)] = &[
        (
            PatternTag::Security,
            r"(?i)\b(sanitiz\w*|escap(?:e[sd]?|ing)|xss|csrf|sql\s*injection|auth(?:enticat\w*|oriz\w*)?|password|credential\w*|secret|token|encrypt\w*|decrypt\w*|vulnerab\w*|permission\w*)\b",
        ),
        (
            PatternTag::BugFix,
            r"(?i)\b(fix(?:es|ed)?|bug|defect|hotfix|regression|workaround|off[-\s]by[-\s]one|null\s*(?:check|pointer|deref\w*)|issue\s*#?\d+)\b",
        ),
        (
            PatternTag::Performance,
            r"(?i)\b(optimi[sz]\w*|performance|perf|cach(?:e[sd]?|ing)|memoi[sz]\w*|throttl\w*|debounc\w*|lazy[-_\s]?load\w*|batch(?:ed|ing)|benchmark\w*)\b",
        ),
        (
            PatternTag::ErrorHandling,
            r"(?i)\btry\b|\bcatch\b|\bfinally\b|\bthrow\b|\bexcept\b|\braise\b|\brescue\b|\.catch\s*\(|\bunwrap_or\b|\bResult<",
        ),
        (
            PatternTag::Refactor,
            r"(?i)\b(refactor\w*|renam(?:e[sd]?|ing)|extract(?:ed|ion)?|inlin(?:e[sd]?|ing)|clean[-\s]?up|simplif\w*|restructur\w*|deduplicat\w*|dead\s+code)\b",
        ),
        (
            PatternTag::NewAlgorithm,
            r"(?i)\b(algorithm|quicksort|mergesort|binary\s+search|traversal?|recursi(?:on|ve)|dynamic\s+programming|memoization|dijkstra|backtrack\w*|heuristic\w*|bfs|dfs)\b",
        ),
        (
            PatternTag::ApiChange,
            r#"(?i)\bendpoint\b|\brouter?\b|@(?:Get|Post|Put|Delete|Patch)Mapping|\bapp\.(?:get|post|put|delete|patch)\s*\(|\bexport\s+(?:async\s+)?(?:function|class|const|interface|type)\b|\bpub\s+fn\b|\bpublic\s+(?:function|class|interface)\b"#,
        ),
        (
            PatternTag::TestAddition,
            r#"(?i)#\[(?:tokio::)?test\]|\b(?:describe|it|should)\s*\(\s*["']|\bassert(?:_eq|_ne|That)?\s*[!(]|\bexpect\s*\(|@Test\b|\bdef\s+test_"#,
        ),
        (
            PatternTag::FrameworkPattern,
            r"(?i)\buse(?:State|Effect|Memo|Callback|Ref|Context)\s*\(|componentDid\w+|\bngOnInit\b|@(?:Component|Injectable|Controller|Service|Module)\b|\bmiddleware\b|\bimpl\s+\w+\s+for\s+|\bderive\s*\(|extends\s+React\.Component",
        ),
        (
            PatternTag::DataAccess,
            r"(?i)\bSELECT\b[^;]{0,120}?\bFROM\b|\bINSERT\s+INTO\b|\bUPDATE\s+\w+\s+SET\b|\bDELETE\s+FROM\b|\bCREATE\s+TABLE\b|\bquery(?:_row|_map)?\s*\(|\bfind(?:One|Many|ById)\b|\bprisma\.|\bmongoose\.|\bsqlalchemy\b",
        ),
    ];

    table
        .iter()
        .map(|(tag, pattern)| Classifier {
            tag: *tag,
            regex: Regex::new(pattern).expect("valid classifier regex"),
        })
        .collect()
});

/// Run every classifier over the edited text. Single pass, independent
/// matches, table order preserved in the output.
pub fn detect_patterns(text: &str) -> Vec<PatternTag> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    CLASSIFIERS
        .iter()
        .filter(|c| c.regex.is_match(text))
        .map(|c| c.tag)
        .collect()
}

/// Resolve the winning category from a set of matched tags.
/// Returns None when no tag matched.
pub fn resolve_category(tags: &[PatternTag]) -> Option<ChangeCategory> {
    tags.iter()
        .min_by_key(|t| t.priority())
        .map(|t| t.category())
}
