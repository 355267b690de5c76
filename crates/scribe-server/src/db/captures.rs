// db/captures.rs
// Capture storage and the suggestion audit log

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

/// Serialize a timestamp in the canonical on-disk format.
///
/// Whole-second RFC 3339 in UTC ("2026-08-07T12:00:00Z") so that string
/// comparison in SQL matches chronological order.
pub fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_db_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// A captured item as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRow {
    pub id: i64,
    pub title: String,
    pub notes: String,
    pub category: Option<String>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub has_context: bool,
    pub has_code: bool,
    pub created_at: DateTime<Utc>,
}

/// Parameters for inserting a capture
#[derive(Debug, Clone)]
pub struct NewCapture {
    pub title: String,
    pub notes: String,
    pub category: Option<String>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub has_context: bool,
    pub has_code: bool,
    pub source: String,
}

/// Insert a capture row
pub fn insert_capture_sync(conn: &Connection, capture: &NewCapture, now: DateTime<Utc>) -> Result<i64> {
    let tags_json = serde_json::to_string(&capture.tags)?;
    conn.execute(
        r#"INSERT INTO captures
           (title, notes, category, language, tags, has_context, has_code, source, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        params![
            capture.title,
            capture.notes,
            capture.category,
            capture.language,
            tags_json,
            capture.has_context as i64,
            capture.has_code as i64,
            capture.source,
            to_db_timestamp(now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Count captures created after the given instant
pub fn count_captures_since_sync(conn: &Connection, since: DateTime<Utc>) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM captures WHERE created_at > ?",
        [to_db_timestamp(since)],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Count captures that have not been assigned a category yet
pub fn count_uncategorized_sync(conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM captures WHERE category IS NULL",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Most recent captures, newest first
pub fn recent_captures_sync(conn: &Connection, limit: i64) -> Result<Vec<CaptureRow>> {
    let mut stmt = conn.prepare(
        r#"SELECT id, title, notes, category, language, tags, has_context, has_code, created_at
           FROM captures
           ORDER BY created_at DESC, id DESC
           LIMIT ?"#,
    )?;

    let rows = stmt.query_map([limit], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, i64>(6)?,
            row.get::<_, i64>(7)?,
            row.get::<_, String>(8)?,
        ))
    })?;

    let mut captures = Vec::new();
    for row in rows.filter_map(crate::db::log_and_discard) {
        let (id, title, notes, category, language, tags_json, has_context, has_code, created_at) =
            row;
        let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
        captures.push(CaptureRow {
            id,
            title,
            notes,
            category,
            language,
            tags,
            has_context: has_context != 0,
            has_code: has_code != 0,
            created_at: parse_db_timestamp(&created_at),
        });
    }
    Ok(captures)
}

/// A surfaced suggestion as recorded in the audit log
#[derive(Debug, Clone)]
pub struct SuggestionLogRow {
    pub kind: String,
    pub tags: Vec<String>,
    pub user_response: Option<String>,
}

/// Record that a suggestion was surfaced
pub fn log_suggestion_sync(
    conn: &Connection,
    id: &str,
    kind: &str,
    reason: &str,
    tags: &[String],
    shown_at: DateTime<Utc>,
) -> Result<()> {
    let tags_json = serde_json::to_string(tags)?;
    conn.execute(
        r#"INSERT OR REPLACE INTO suggestion_log (id, kind, reason, tags, shown_at)
           VALUES (?, ?, ?, ?, ?)"#,
        params![id, kind, reason, tags_json, to_db_timestamp(shown_at)],
    )?;
    Ok(())
}

/// Look up a surfaced suggestion by correlation id
pub fn get_suggestion_sync(conn: &Connection, id: &str) -> Result<Option<SuggestionLogRow>> {
    let row = conn
        .query_row(
            "SELECT kind, tags, user_response FROM suggestion_log WHERE id = ?",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(kind, tags_json, user_response)| SuggestionLogRow {
        kind,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        user_response,
    }))
}

/// Record the user's response to a surfaced suggestion
pub fn record_suggestion_response_sync(
    conn: &Connection,
    id: &str,
    response: &str,
    responded_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"UPDATE suggestion_log
           SET user_response = ?, responded_at = ?
           WHERE id = ?"#,
        params![response, to_db_timestamp(responded_at), id],
    )?;
    Ok(())
}
