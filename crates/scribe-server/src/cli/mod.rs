// crates/scribe-server/src/cli/mod.rs
// CLI subcommand implementations

pub mod analyze;
pub mod observe;
pub mod stats;

use std::path::PathBuf;

/// Default database location (~/.scribe/scribe.db), overridable per command
/// or via SCRIBE_DB_PATH.
pub fn default_db_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".scribe").join("scribe.db")
}

/// Resolve the database path: CLI flag > env override > default
pub fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| crate::config::EnvOverrides::from_env().db_path)
        .unwrap_or_else(default_db_path)
}
