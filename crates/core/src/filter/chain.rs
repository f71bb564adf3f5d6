//! Chain assembly.
//!
//! Stages are created from an ordered list of kinds and linked tail to head, so
//! every stage receives a fully built successor before it is itself attached.

use super::{BloomFilter, CacheAsideFilter, FakeFilter, Filter};
use crate::Error;
use crate::config::AppConfig;
use crate::store::{MemoryStore, SqliteStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Creates unlinked stages by kind.
#[async_trait]
pub trait StageFactory: Send + Sync {
    /// Create a stage of `kind`, or fail with [`Error::ChainMisconfigured`] for
    /// an unknown kind.
    async fn create(&self, kind: &str) -> Result<Box<dyn Filter>, Error>;
}

/// Stage factory driven by [`AppConfig`].
pub struct ConfigFactory<'a> {
    config: &'a AppConfig,
}

impl<'a> ConfigFactory<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StageFactory for ConfigFactory<'_> {
    async fn create(&self, kind: &str) -> Result<Box<dyn Filter>, Error> {
        match kind {
            "fake" => Ok(Box::new(FakeFilter::new(self.config.fake.markers.clone()))),
            "memory" => Ok(Box::new(CacheAsideFilter::new(Arc::new(MemoryStore::new("memory"))))),
            "sqlite" => {
                let store = SqliteStore::open_with(&self.config.sqlite).await?;
                Ok(Box::new(CacheAsideFilter::new(Arc::new(store))))
            }
            "bloom" => {
                let bloom = &self.config.bloom;
                let store = SqliteStore::open_with(&bloom.store).await?;
                let source = SqliteStore::open_with(&bloom.source).await?;
                Ok(Box::new(BloomFilter::new(
                    Arc::new(store),
                    Arc::new(source),
                    bloom.page_size,
                    bloom.refresh_interval(),
                )))
            }
            other => Err(Error::ChainMisconfigured(format!("unknown filter type: {other}"))),
        }
    }
}

/// Build a chain from `kinds`, head first.
///
/// Either the whole chain is returned or nothing is: stages built before a
/// failure are shut down and dropped.
pub async fn build<S: AsRef<str>>(kinds: &[S], factory: &dyn StageFactory) -> Result<Box<dyn Filter>, Error> {
    if kinds.is_empty() {
        return Err(Error::ChainMisconfigured("no filters configured".into()));
    }

    let mut next: Option<Box<dyn Filter>> = None;
    for kind in kinds.iter().rev() {
        let kind = kind.as_ref();
        let mut stage = match factory.create(kind).await {
            Ok(stage) => stage,
            Err(e) => {
                if let Some(partial) = next.take() {
                    tracing::debug!(stage = partial.name(), "discarding partially built chain");
                    partial.shutdown();
                }
                return Err(e);
            }
        };

        if let Err(e) = stage.attach_next(next.take()) {
            stage.shutdown();
            return Err(e);
        }
        tracing::debug!(stage = stage.name(), "filter stage added");
        next = Some(stage);
    }

    let head = next.ok_or_else(|| Error::ChainMisconfigured("no filters configured".into()))?;
    tracing::info!(head = head.name(), stages = kinds.len(), "filter chain built");
    Ok(head)
}

/// Build the chain described by `config.filters`.
pub async fn build_from_config(config: &AppConfig) -> Result<Box<dyn Filter>, Error> {
    build(config.filters.as_slice(), &ConfigFactory::new(config)).await
}
