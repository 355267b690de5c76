// crates/scribe-server/src/db/schema.rs
// Database schema and migrations

use anyhow::Result;
use rusqlite::Connection;

/// Run all schema setup and migrations.
///
/// Called during pool creation. Idempotent - every statement checks for
/// existing tables before making changes.
pub fn run_all_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Database schema SQL
pub const SCHEMA: &str = r#"
-- =======================================
-- Key-value store (notification stats live here as a JSON document)
-- =======================================
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- =======================================
-- Captured items
-- =======================================
CREATE TABLE IF NOT EXISTS captures (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    notes TEXT NOT NULL DEFAULT '',
    category TEXT,
    language TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    has_context INTEGER NOT NULL DEFAULT 0,
    has_code INTEGER NOT NULL DEFAULT 0,
    source TEXT NOT NULL DEFAULT 'save',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_captures_created ON captures(created_at);
CREATE INDEX IF NOT EXISTS idx_captures_category ON captures(category);

-- =======================================
-- Audit log of surfaced suggestions
-- =======================================
CREATE TABLE IF NOT EXISTS suggestion_log (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    reason TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    shown_at TEXT NOT NULL,
    user_response TEXT,
    responded_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_suggestion_log_shown ON suggestion_log(shown_at);
"#;
