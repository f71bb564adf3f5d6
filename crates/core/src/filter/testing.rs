//! Test doubles shared by the filter tests.

use super::{Filter, Lookup, Verdict};
use crate::Error;
use crate::store::{Connector, Loader, MemoryStore, Page};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn unavailable(store: &str) -> Error {
    Error::StoreUnavailable { store: store.into(), reason: "Bad things happened!".into() }
}

/// Connector over a plain set whose reads and writes can be made to fail.
#[derive(Default)]
pub struct ScriptedConnector {
    keys: Mutex<HashSet<String>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_keys(keys: &[&str]) -> Arc<Self> {
        let conn = Self::default();
        conn.keys.lock().unwrap().extend(keys.iter().map(|k| k.to_string()));
        Arc::new(conn)
    }

    pub fn failing_reads() -> Arc<Self> {
        let conn = Self::default();
        conn.fail_reads.store(true, Ordering::SeqCst);
        Arc::new(conn)
    }

    pub fn failing_writes() -> Arc<Self> {
        let conn = Self::default();
        conn.fail_writes.store(true, Ordering::SeqCst);
        Arc::new(conn)
    }

    pub fn has(&self, key: &str) -> bool {
        self.keys.lock().unwrap().contains(key)
    }

    pub fn key_count(&self) -> usize {
        self.keys.lock().unwrap().len()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn contains_key(&self, key: &str) -> Result<bool, Error> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("scripted"));
        }
        Ok(self.has(key))
    }

    async fn insert_key(&self, key: &str) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable("scripted"));
        }
        self.keys.lock().unwrap().insert(key.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Successor that always answers the same way and counts how often it was asked.
pub struct ScriptedFilter {
    verdict: Verdict,
    error: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFilter {
    pub fn new(verdict: Verdict, error: bool) -> (Box<dyn Filter>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(Self { verdict, error, calls: calls.clone() }), calls)
    }

    pub fn flagged() -> (Box<dyn Filter>, Arc<AtomicUsize>) {
        Self::new(Verdict::Flagged, false)
    }

    pub fn clear() -> (Box<dyn Filter>, Arc<AtomicUsize>) {
        Self::new(Verdict::Clear, false)
    }

    pub fn inconclusive() -> (Box<dyn Filter>, Arc<AtomicUsize>) {
        Self::new(Verdict::Inconclusive, true)
    }
}

#[async_trait]
impl Filter for ScriptedFilter {
    fn attach_next(&mut self, _next: Option<Box<dyn Filter>>) -> Result<(), Error> {
        Ok(())
    }

    async fn contains_url(&self, _url: &str) -> Lookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Lookup { verdict: self.verdict, error: self.error.then(|| unavailable("successor")) }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Loader over a [`MemoryStore`] that can fail and counts its calls.
pub struct ScriptedLoader {
    source: MemoryStore,
    pub fail_pages: AtomicBool,
    pub fail_max_id: AtomicBool,
    pub max_id_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
}

impl ScriptedLoader {
    pub fn new(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            source: MemoryStore::with_urls("source", urls.iter().copied()),
            fail_pages: AtomicBool::new(false),
            fail_max_id: AtomicBool::new(false),
            max_id_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
        })
    }

    pub async fn add(&self, urls: &[&str]) {
        for url in urls {
            self.source.insert_key(url).await.unwrap();
        }
    }
}

#[async_trait]
impl Loader for ScriptedLoader {
    async fn max_id(&self) -> Result<u64, Error> {
        self.max_id_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_max_id.load(Ordering::SeqCst) {
            return Err(unavailable("source"));
        }
        self.source.max_id().await
    }

    async fn page(&self, start_id: u64, count: u64) -> Result<Page, Error> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(unavailable("source"));
        }
        self.source.page(start_id, count).await
    }
}
