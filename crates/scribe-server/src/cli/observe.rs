// cli/observe.rs
// The observe loop: activity signals in as JSON lines on stdin, surfaced
// suggestions out as JSON lines on stdout. The editor host pipes both ends.

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::EngineSettings;
use crate::db::DatabasePool;
use crate::notify::JsonlNotifier;
use crate::orchestrator::ProactiveOrchestrator;
use crate::worker;
use scribe_types::{ActivitySignal, SuggestionResponse};

/// A line of host input: either an activity signal or a response to a
/// previously surfaced suggestion (correlated by id).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostInput {
    Response {
        id: String,
        response: SuggestionResponse,
    },
    Signal(ActivitySignal),
}

pub async fn run(db_path: Option<PathBuf>) -> Result<()> {
    let db_path = super::resolve_db_path(db_path);
    let pool = Arc::new(DatabasePool::open(&db_path).await?);
    let settings = EngineSettings::load();

    if !settings.enabled {
        info!("proactive mode disabled; observing without suggestions");
    }

    let orchestrator = Arc::new(
        ProactiveOrchestrator::new(pool, Arc::new(JsonlNotifier), settings).await,
    );
    let shutdown = worker::spawn(orchestrator.clone());

    info!(db = %db_path.display(), "observing activity on stdin");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HostInput>(&line) {
            Ok(HostInput::Signal(signal)) => orchestrator.on_signal(signal).await,
            Ok(HostInput::Response { id, response }) => {
                orchestrator.on_response(&id, response).await
            }
            Err(e) => {
                warn!("unparseable input line: {}", e);
            }
        }
    }

    debug!("stdin closed, shutting down");
    let _ = shutdown.send(true);
    Ok(())
}
