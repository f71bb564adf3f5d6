//! Store connectors backing the filter stages.
//!
//! A [`Connector`] answers membership questions for one stage and accepts
//! back-filled keys. A [`Loader`] enumerates an authoritative source by
//! monotonically increasing id so a pre-filter can page it in.
//!
//! Keys are opaque strings compared byte-for-byte; nothing here normalises
//! scheme, case or trailing slashes.

pub mod connection;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod urls;

pub use crate::Error;

pub use connection::SqliteStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Membership operations over one backing store.
///
/// Implementations must tolerate unsynchronised concurrent use: every lookup in
/// flight and a pre-filter's refresh task share the same instance.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Check whether `key` is present.
    async fn contains_key(&self, key: &str) -> Result<bool, Error>;

    /// Add `key`. Adding a key that is already present is not an error.
    async fn insert_key(&self, key: &str) -> Result<(), Error>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// One page of keys from an authoritative source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Keys with `id >= start_id`, in id order.
    pub keys: Vec<String>,
    /// Id of the last row returned, or `start_id - 1` for an empty page.
    pub high_water_id: u64,
}

/// Paged enumeration of an authoritative source.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Largest id currently present, 0 when empty.
    async fn max_id(&self) -> Result<u64, Error>;

    /// Up to `count` keys starting at the inclusive id `start_id`.
    async fn page(&self, start_id: u64, count: u64) -> Result<Page, Error>;
}
