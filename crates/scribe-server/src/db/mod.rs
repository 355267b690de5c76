// crates/scribe-server/src/db/mod.rs
// Database access: connection pool, schema, capture + suggestion storage

pub mod captures;
pub mod pool;
pub mod schema;

pub use captures::{
    CaptureRow, NewCapture, count_captures_since_sync, count_uncategorized_sync,
    get_suggestion_sync, insert_capture_sync, log_suggestion_sync, recent_captures_sync,
    record_suggestion_response_sync,
};
pub use pool::DatabasePool;

/// Log and discard row-mapping errors inside `filter_map` chains.
///
/// Malformed rows are skipped rather than aborting the whole query.
pub fn log_and_discard<T, E: std::fmt::Display>(result: Result<T, E>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!("discarding malformed row: {}", e);
            None
        }
    }
}
