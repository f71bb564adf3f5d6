//! URL store schema upgrades.
//!
//! The schema version lives in SQLite's `user_version` header field, so a
//! store file carries no bookkeeping table of its own.

use super::Error;
use tokio_rusqlite::Connection;

/// Schema steps as (version, SQL), ascending. A step runs once, when the
/// store's `user_version` is below its version.
const SCHEMA: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_urls.sql"))];

/// Latest schema version this build knows about.
pub const SCHEMA_VERSION: i64 = SCHEMA[SCHEMA.len() - 1].0;

/// Bring the store up to [`SCHEMA_VERSION`].
///
/// Each step and its version bump commit together. A store already at a
/// newer version is left untouched.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for &(version, sql) in SCHEMA.iter().filter(|(version, _)| *version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("schema version {version}: {e}")))?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
            tracing::debug!(version, "upgraded url store schema");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
