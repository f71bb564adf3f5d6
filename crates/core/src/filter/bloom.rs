//! Bloom filter pre-stage.
//!
//! Bloom filters check membership in a large set. A negative answer is final,
//! but a positive answer may be a false positive, so this stage always needs a
//! secondary filter to confirm hits.
//!
//! The set lives in a backing store and is paged in from an authoritative
//! [`Loader`] by a background task: one catch-up load at start, then one per
//! refresh interval. Until the first catch-up completes the set is incomplete
//! and lookups skip this stage entirely.

use super::{Filter, Lookup};
use crate::Error;
use crate::store::{Connector, Loader};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// Snapshot of how far a bloom filter has loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadCursor {
    /// Id of the last source row inserted. Never decreases.
    pub last_loaded_id: u64,
    /// URLs inserted since the stage was created.
    pub total_loaded: u64,
    /// Whether a full catch-up has completed.
    pub ready: bool,
}

#[derive(Debug, Default)]
struct Progress {
    last_loaded_id: u64,
    total_loaded: u64,
}

/// Loading state shared between the stage and its refresh task.
struct Refresher {
    store: Arc<dyn Connector>,
    loader: Arc<dyn Loader>,
    page_size: u64,
    /// Held for a whole catch-up, so two loads never interleave.
    progress: Mutex<Progress>,
    ready: AtomicBool,
}

impl Refresher {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn page_failed(&self, e: &Error) -> Error {
        Error::LoadPageFailed { store: self.store.name().to_string(), reason: e.to_string() }
    }

    /// Insert every source row newer than the cursor into the store.
    ///
    /// Stops between pages once `shutdown` is signalled. Returns the number of
    /// URLs inserted by this call.
    async fn catch_up(&self, shutdown: Option<&watch::Receiver<bool>>) -> Result<u64, Error> {
        let mut progress = self.progress.lock().await;
        let max_id = self.loader.max_id().await.map_err(|e| self.page_failed(&e))?;

        let mut loaded = 0u64;
        while progress.last_loaded_id < max_id {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                tracing::debug!(store = self.store.name(), "bloom filter load interrupted by shutdown");
                return Ok(loaded);
            }

            let start = progress.last_loaded_id + 1;
            let page = self
                .loader
                .page(start, self.page_size)
                .await
                .map_err(|e| self.page_failed(&e))?;

            if page.high_water_id < start {
                return Err(Error::LoadPageFailed {
                    store: self.store.name().to_string(),
                    reason: format!("no rows at or after id {start} although the max id is {max_id}"),
                });
            }

            for url in &page.keys {
                self.store.insert_key(url).await.map_err(|e| self.page_failed(&e))?;
            }

            progress.last_loaded_id = page.high_water_id;
            progress.total_loaded += page.keys.len() as u64;
            loaded += page.keys.len() as u64;
        }

        if !self.ready.swap(true, Ordering::AcqRel) {
            tracing::info!(store = self.store.name(), total = progress.total_loaded, "bloom filter is ready");
        }
        tracing::info!(
            store = self.store.name(),
            loaded,
            total = progress.total_loaded,
            "bloom filter load complete"
        );
        Ok(loaded)
    }

    async fn run(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.catch_up(Some(&shutdown)).await {
                tracing::warn!(store = self.store.name(), error = %e, "failed to load bloom filter");
            }

            tokio::select! {
                // Either the stop signal or the stage being dropped.
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        tracing::debug!(store = self.store.name(), "bloom filter refresh stopped");
    }
}

/// Probabilistic pre-filter backed by a store and loaded from a source.
pub struct BloomFilter {
    next: Option<Box<dyn Filter>>,
    store: Arc<dyn Connector>,
    refresher: Arc<Refresher>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    name: String,
}

impl BloomFilter {
    /// Create a bloom filter and start its background loading task.
    ///
    /// The stage is unusable until [`Filter::attach_next`] gives it a secondary
    /// filter; [`build`](super::build) always does. Must be called from within
    /// a Tokio runtime.
    pub fn new(
        store: Arc<dyn Connector>, loader: Arc<dyn Loader>, page_size: u64, refresh_interval: Duration,
    ) -> Self {
        let mut filter = Self::without_refresh(store, loader, page_size);
        let task = tokio::spawn(filter.refresher.clone().run(refresh_interval, filter.shutdown.subscribe()));
        filter.task = Some(task);
        filter
    }

    /// Create a bloom filter with no background task; loads happen only
    /// through [`BloomFilter::load`].
    ///
    /// As with [`BloomFilter::new`], a secondary filter must be attached before
    /// lookups.
    pub fn without_refresh(store: Arc<dyn Connector>, loader: Arc<dyn Loader>, page_size: u64) -> Self {
        let name = format!("bloom[{}]", store.name());
        let refresher = Arc::new(Refresher {
            store: store.clone(),
            loader,
            page_size: page_size.max(1),
            progress: Mutex::new(Progress::default()),
            ready: AtomicBool::new(false),
        });
        let (shutdown, _) = watch::channel(false);
        Self { next: None, store, refresher, shutdown, task: None, name }
    }

    /// Run one catch-up load now.
    ///
    /// Waits for an in-flight background load to finish first.
    pub async fn load(&self) -> Result<u64, Error> {
        self.refresher.catch_up(None).await
    }

    /// Current load progress.
    pub async fn cursor(&self) -> LoadCursor {
        let progress = self.refresher.progress.lock().await;
        LoadCursor {
            last_loaded_id: progress.last_loaded_id,
            total_loaded: progress.total_loaded,
            ready: self.refresher.is_ready(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.refresher.is_ready()
    }

    /// Whether the background loading task is still running.
    pub fn is_refreshing(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the background loading task.
    ///
    /// Idempotent. A load in progress finishes its current page and then stops.
    pub fn stop_loading(&self) {
        if !self.shutdown.send_replace(true) {
            tracing::debug!(stage = %self.name, "stopping bloom filter refresh");
        }
    }
}

impl Drop for BloomFilter {
    fn drop(&mut self) {
        self.stop_loading();
    }
}

#[async_trait]
impl Filter for BloomFilter {
    /// Bloom filters require a secondary filter.
    fn attach_next(&mut self, next: Option<Box<dyn Filter>>) -> Result<(), Error> {
        match next {
            Some(next) => {
                self.next = Some(next);
                Ok(())
            }
            None => Err(Error::ChainMisconfigured(format!(
                "{} can't be configured without a secondary filter",
                self.name
            ))),
        }
    }

    /// A miss in the store is final. A hit may be a false positive and an
    /// error says nothing, so both are confirmed with the secondary filter.
    async fn contains_url(&self, url: &str) -> Lookup {
        // Only reachable for a stage used outside the chain builder without
        // attach_next; the server reports it as a broken chain.
        let Some(next) = &self.next else {
            return Lookup::inconclusive(Error::ChainMisconfigured(format!("{} has no secondary filter", self.name)));
        };

        if !self.refresher.is_ready() {
            tracing::debug!(stage = %self.name, url, "bloom filter is not yet loaded, checking the next filter");
            return next.contains_url(url).await;
        }

        match self.store.contains_key(url).await {
            Ok(false) => {
                tracing::debug!(stage = %self.name, url, "URL not found in bloom filter");
                Lookup::clear()
            }
            Ok(true) => {
                tracing::debug!(stage = %self.name, url, "URL found in bloom filter, checking the next filter");
                next.contains_url(url).await
            }
            Err(e) => {
                tracing::warn!(stage = %self.name, url, error = %e, "bloom filter lookup failed, checking the next filter");
                next.contains_url(url).await.with_earlier_error(e)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shutdown(&self) {
        self.stop_loading();
        if let Some(next) = &self.next {
            next.shutdown();
        }
    }
}
