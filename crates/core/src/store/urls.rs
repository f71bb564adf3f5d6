//! URL set operations on [`SqliteStore`].
//!
//! Rows are addressed two ways: by `url_hash` for membership probes, and by the
//! autoincrement `id` for paged enumeration. Ids only ever grow, which is what
//! lets a pre-filter resume loading from the last id it saw.

use super::connection::SqliteStore;
use super::hash::url_key;
use super::{Connector, Loader, Page};
use crate::Error;
use async_trait::async_trait;
use tokio_rusqlite::params;

impl SqliteStore {
    /// Number of URLs stored.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM urls", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert many URLs in a single transaction.
    ///
    /// Returns how many were new; URLs already present are skipped.
    pub async fn insert_many(&self, urls: Vec<String>) -> Result<u64, Error> {
        let added_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let mut added = 0u64;
                {
                    let mut stmt =
                        tx.prepare("INSERT OR IGNORE INTO urls (url, url_hash, added_at) VALUES (?1, ?2, ?3)")?;
                    for url in &urls {
                        added += stmt.execute(params![url, url_key(url), added_at])? as u64;
                    }
                }
                tx.commit()?;
                Ok(added)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl Connector for SqliteStore {
    async fn contains_key(&self, key: &str) -> Result<bool, Error> {
        let url = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let found: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM urls WHERE url_hash = ?1 AND url = ?2)",
                    params![url_key(&url), url],
                    |row| row.get(0),
                )?;
                Ok(found)
            })
            .await
            .map_err(Error::from)
    }

    async fn insert_key(&self, key: &str) -> Result<(), Error> {
        let url = key.to_string();
        let added_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO urls (url, url_hash, added_at) VALUES (?1, ?2, ?3)",
                    params![url, url_key(&url), added_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Loader for SqliteStore {
    async fn max_id(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let max: i64 = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM urls", [], |row| row.get(0))?;
                Ok(max as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn page(&self, start_id: u64, count: u64) -> Result<Page, Error> {
        let start = start_id as i64;
        let limit = count as i64;
        self.conn
            .call(move |conn| -> Result<Page, Error> {
                let mut stmt = conn.prepare("SELECT id, url FROM urls WHERE id >= ?1 ORDER BY id LIMIT ?2")?;
                let rows = stmt.query_map(params![start, limit], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut page = Page { keys: Vec::new(), high_water_id: start_id.saturating_sub(1) };
                for row in rows {
                    let (id, url) = row?;
                    page.keys.push(url);
                    page.high_water_id = id as u64;
                }
                Ok(page)
            })
            .await
            .map_err(Error::from)
    }
}
