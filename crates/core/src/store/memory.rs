//! In-process URL set.
//!
//! Backs the `memory` stage kind, a per-process cache in front of slower stores.
//! Every key gets the next id in insertion order, so it can also serve as a
//! small authoritative source for a pre-filter.

use super::{Connector, Loader, Page};
use crate::Error;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Entries {
    /// Key with id `n` lives at index `n - 1`.
    ordered: Vec<String>,
    members: HashSet<String>,
}

/// In-memory URL set.
///
/// Uses a HashSet with tokio RwLock for concurrent access. Cloning shares the
/// same set.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<Entries>>,
    name: String,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(name: impl Into<String>) -> Self {
        Self { entries: Arc::new(RwLock::new(Entries::default())), name: name.into() }
    }

    /// Create a store pre-populated with `urls`, ids assigned in order.
    pub fn with_urls<I, S>(name: impl Into<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Entries::default();
        for url in urls {
            entries.insert(url.into());
        }
        Self { entries: Arc::new(RwLock::new(entries)), name: name.into() }
    }

    /// Number of keys stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.ordered.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Entries {
    fn insert(&mut self, key: String) {
        if self.members.insert(key.clone()) {
            self.ordered.push(key);
        }
    }
}

#[async_trait]
impl Connector for MemoryStore {
    async fn contains_key(&self, key: &str) -> Result<bool, Error> {
        Ok(self.entries.read().await.members.contains(key))
    }

    async fn insert_key(&self, key: &str) -> Result<(), Error> {
        self.entries.write().await.insert(key.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Loader for MemoryStore {
    async fn max_id(&self) -> Result<u64, Error> {
        Ok(self.entries.read().await.ordered.len() as u64)
    }

    async fn page(&self, start_id: u64, count: u64) -> Result<Page, Error> {
        let entries = self.entries.read().await;
        let skip = start_id.saturating_sub(1) as usize;
        let keys: Vec<String> = entries.ordered.iter().skip(skip).take(count as usize).cloned().collect();
        let high_water_id = start_id.saturating_sub(1) + keys.len() as u64;
        Ok(Page { keys, high_water_id })
    }
}
