// cli/stats.rs
// Dump the persisted notification stats for inspecting the learning loop

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::db::DatabasePool;
use crate::gate::NotificationStats;

pub async fn run(db_path: Option<PathBuf>) -> Result<()> {
    let db_path = super::resolve_db_path(db_path);
    let pool = Arc::new(DatabasePool::open(&db_path).await?);

    let stats = pool
        .interact(|conn| Ok(NotificationStats::load_sync(conn)))
        .await?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
