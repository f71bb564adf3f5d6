//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use crate::Error;
use crate::config::SqliteConfig;
use std::path::Path;
use tokio_rusqlite::Connection;

const BASE_PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA busy_timeout=5000;";

/// SQLite-backed URL store.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread, so awaiting a query never blocks the runtime.
/// Cloning shares the same connection.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) conn: Connection,
    pub(crate) name: String,
}

impl SqliteStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let name = format!("sqlite:{}", path.as_ref().display());
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, name, &[]).await
    }

    /// Open the store described by `config`, applying its extra pragmas.
    pub async fn open_with(config: &SqliteConfig) -> Result<Self, Error> {
        let name = format!("sqlite:{}", config.path.display());
        let conn = Connection::open(&config.path)
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, name, &config.pragmas).await
    }

    /// Open an in-memory database for testing.
    ///
    /// Creates a temporary in-memory SQLite database with the same
    /// pragma configuration as file-based databases.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, "sqlite::memory:".into(), &[]).await
    }

    async fn prepare(conn: Connection, name: String, pragmas: &[String]) -> Result<Self, Error> {
        let extra = pragmas.iter().map(|p| format!("PRAGMA {p};")).collect::<Vec<_>>().join("\n");

        conn.call(move |conn| {
            conn.execute_batch(BASE_PRAGMAS)?;
            if !extra.is_empty() {
                conn.execute_batch(&extra)?;
            }
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        tracing::debug!(store = %name, "opened url store");
        Ok(Self { conn, name })
    }
}
