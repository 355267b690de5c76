// crates/scribe-server/src/notify/mod.rs
// "Show a suggestion and await the response" abstraction.
//
// The engine treats the host's interruption UI as a black box returning one
// of accept/dismiss/suppress-more/none. Every request carries a correlation
// id so hosts that cannot block (JSONL over stdio) can answer later through
// the response entry point.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use scribe_types::{SuggestionKind, SuggestionRequest, SuggestionResponse};

/// Host-side suggestion presenter
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a suggestion and await the user's response.
    ///
    /// Implementations that cannot block return `None` immediately and
    /// deliver the real response later, correlated by `request.id`.
    async fn notify(&self, request: &SuggestionRequest) -> Result<SuggestionResponse>;
}

/// Build a request with a fresh correlation id
pub fn new_request(
    kind: SuggestionKind,
    title: impl Into<String>,
    body: impl Into<String>,
    reason: impl Into<String>,
    tags: Vec<String>,
) -> SuggestionRequest {
    SuggestionRequest {
        id: Uuid::new_v4().to_string(),
        kind,
        title: title.into(),
        body: body.into(),
        reason: reason.into(),
        tags,
    }
}

/// Writes suggestions as JSON lines to stdout. Responses arrive out-of-band
/// on stdin and reach the engine via the response entry point.
pub struct JsonlNotifier;

#[async_trait]
impl Notifier for JsonlNotifier {
    async fn notify(&self, request: &SuggestionRequest) -> Result<SuggestionResponse> {
        let line = serde_json::to_string(request)?;
        println!("{}", line);
        Ok(SuggestionResponse::None)
    }
}
