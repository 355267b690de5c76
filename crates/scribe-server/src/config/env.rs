// crates/scribe-server/src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;

/// Environment overrides for the engine settings.
///
/// Set `SCRIBE_DISABLE_PROACTIVE=1` to silence all proactive suggestions.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// Proactive mode disabled (SCRIBE_DISABLE_PROACTIVE)
    pub disabled: bool,
    /// Base cooldown override, minutes (SCRIBE_COOLDOWN_MINUTES)
    pub cooldown_minutes: Option<i64>,
    /// Digest weekday override (SCRIBE_DIGEST_WEEKDAY)
    pub digest_weekday: Option<String>,
    /// Database path override (SCRIBE_DB_PATH)
    pub db_path: Option<PathBuf>,
}

impl EnvOverrides {
    /// Load overrides from environment variables (single source of truth)
    pub fn from_env() -> Self {
        Self {
            disabled: parse_bool_env("SCRIBE_DISABLE_PROACTIVE").unwrap_or(false),
            cooldown_minutes: read_var("SCRIBE_COOLDOWN_MINUTES").and_then(|v| v.parse().ok()),
            digest_weekday: read_var("SCRIBE_DIGEST_WEEKDAY"),
            db_path: read_var("SCRIBE_DB_PATH").map(PathBuf::from),
        }
    }
}

/// Read a single env var, filtering empty values
fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a boolean env var ("1", "true", "yes" are truthy)
pub fn parse_bool_env(name: &str) -> Option<bool> {
    read_var(name).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
