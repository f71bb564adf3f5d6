//! Cache-aside stage.
//!
//! Checks its own store first. A hit is final. On a miss, or when the store
//! cannot answer, the lookup goes to the successor, and a positive answer from
//! there is written back so the next lookup for the same URL stops here.

use super::{Filter, Lookup};
use crate::Error;
use crate::store::Connector;
use async_trait::async_trait;
use std::sync::Arc;

/// Store-backed filter, usable as a cache or, without a successor, as the
/// final authority.
pub struct CacheAsideFilter {
    next: Option<Box<dyn Filter>>,
    store: Arc<dyn Connector>,
    name: String,
}

impl CacheAsideFilter {
    pub fn new(store: Arc<dyn Connector>) -> Self {
        let name = format!("cache[{}]", store.name());
        Self { next: None, store, name }
    }
}

#[async_trait]
impl Filter for CacheAsideFilter {
    /// A successor is optional: without one this stage is the end of the chain.
    fn attach_next(&mut self, next: Option<Box<dyn Filter>>) -> Result<(), Error> {
        self.next = next;
        Ok(())
    }

    async fn contains_url(&self, url: &str) -> Lookup {
        let cached = self.store.contains_key(url).await;
        match &cached {
            Ok(true) => {
                tracing::debug!(stage = %self.name, url, "URL found in cache");
                return Lookup::flagged();
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(stage = %self.name, url, error = %e, "cache lookup failed"),
        }

        let Some(next) = &self.next else {
            return Lookup::from(cached);
        };

        // The successor has better information than a failed read here.
        let lookup = next.contains_url(url).await;
        if !lookup.found() {
            return lookup;
        }

        match self.store.insert_key(url).await {
            Ok(()) => {
                tracing::debug!(stage = %self.name, url, "back-filled cache");
                lookup
            }
            Err(e) => {
                tracing::warn!(stage = %self.name, url, error = %e, "failed to back-fill cache");
                lookup.with_later_error(e)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn shutdown(&self) {
        if let Some(next) = &self.next {
            next.shutdown();
        }
    }
}
