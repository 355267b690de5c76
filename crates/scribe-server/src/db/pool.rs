// db/pool.rs
// Async connection pool using deadpool-sqlite
//
// The closure-based accessors run on a blocking thread pool, so database
// work never blocks the async runtime. Prefer `run()` where a ScribeError
// is wanted and `interact()` for internal anyhow-based plumbing.

use crate::error::ScribeError;
use anyhow::{Context, Result};
use deadpool_sqlite::{Config, Pool, Runtime};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database pool wrapper with per-connection setup and schema migrations.
pub struct DatabasePool {
    pool: Pool,
    path: Option<PathBuf>,
    /// URI for in-memory databases (used to share state in tests)
    memory_uri: Option<String>,
}

/// Whether to use a file path or shared in-memory URI.
enum DbStorage {
    File(PathBuf),
    InMemory,
}

impl DatabasePool {
    /// Open a pooled database at the given path, creating parent directories
    /// and running migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::open_internal(DbStorage::File(path.to_path_buf())).await
    }

    /// Open a pooled in-memory database.
    ///
    /// Uses a shared cache URI so all connections access the same in-memory
    /// database. This is critical for tests - without shared cache, each
    /// connection would get its own separate database.
    pub async fn open_in_memory() -> Result<Self> {
        Self::open_internal(DbStorage::InMemory).await
    }

    async fn open_internal(storage: DbStorage) -> Result<Self> {
        let (conn_str, path, memory_uri) = match storage {
            DbStorage::File(p) => {
                ensure_parent_directory(&p)?;
                (p.to_string_lossy().to_string(), Some(p), None)
            }
            DbStorage::InMemory => {
                let uri = format!(
                    "file:memdb_{}?mode=memory&cache=shared",
                    uuid::Uuid::new_v4()
                );
                (uri.clone(), None, Some(uri))
            }
        };

        let cfg = Config::new(&conn_str);
        let pool = cfg
            .builder(Runtime::Tokio1)
            .context("Failed to create pool builder")?
            .max_size(4)
            .build()
            .context("Failed to build connection pool")?;

        let db_pool = Self {
            pool,
            path,
            memory_uri,
        };

        db_pool
            .interact(|conn| {
                conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
                crate::db::schema::run_all_migrations(conn)
            })
            .await?;

        Ok(db_pool)
    }

    /// Get the memory URI (for sharing state in tests)
    pub fn memory_uri(&self) -> Option<&str> {
        self.memory_uri.as_deref()
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a closure with a connection from the pool.
    pub async fn interact<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self
            .pool
            .get()
            .await
            .context("Failed to get connection from pool")?;

        conn.interact(move |conn| f(conn))
            .await
            .map_err(|e| anyhow::anyhow!("interact failed: {e}"))?
    }

    /// Run a closure on a pooled connection, logging errors at debug but not
    /// propagating. Use for low-priority best-effort operations.
    pub async fn try_interact<F, R>(&self, label: &str, f: F) -> Option<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let label = label.to_string();
        match self.interact(move |conn| f(conn)).await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!("{}: {}", label, e);
                None
            }
        }
    }

    /// Like `try_interact` but logs failures at warn level.
    /// Use for important best-effort operations (stats flush, audit log).
    pub async fn try_interact_warn<F, R>(&self, label: &str, f: F) -> Option<R>
    where
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let label = label.to_string();
        match self.interact(move |conn| f(conn)).await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", label, e);
                None
            }
        }
    }

    /// Run a closure and convert errors to ScribeError.
    pub async fn run<F, R, E>(&self, f: F) -> Result<R, ScribeError>
    where
        F: FnOnce(&Connection) -> Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: Into<ScribeError> + Send + 'static,
    {
        self.pool
            .get()
            .await
            .map_err(|e| ScribeError::Other(format!("Failed to get connection: {}", e)))?
            .interact(move |conn| f(conn).map_err(Into::into))
            .await
            .map_err(|e| ScribeError::Other(format!("Database error: {}", e)))?
    }
}

/// Create the parent directory of a database file if it doesn't exist.
fn ensure_parent_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
