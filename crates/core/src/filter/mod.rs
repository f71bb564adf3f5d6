//! Chainable filters that decide whether a URL is known-bad.
//!
//! A chain is a singly linked list of [`Filter`] stages consulted head to tail.
//! Each stage owns its successor. Earlier stages are cheaper and less
//! authoritative; a stage hands a lookup on when it cannot settle it alone.
//!
//! ### Stages
//! - [`FakeFilter`]: terminal stub, flags URLs containing configured markers.
//! - [`CacheAsideFilter`]: reads its store first, back-fills it with positive
//!   answers learned from later stages.
//! - [`BloomFilter`]: probabilistic pre-filter paged in from an authoritative
//!   source by a background task; only a negative answer is final.
//!
//! ### Results
//! A lookup yields a [`Lookup`]: a three-way [`Verdict`] plus the first error
//! seen along the way. An error never silently turns into "clear".

pub mod bloom;
pub mod cache_aside;
pub mod chain;
pub mod fake;

#[cfg(test)]
mod testing;

pub use bloom::{BloomFilter, LoadCursor};
pub use cache_aside::CacheAsideFilter;
pub use chain::{ConfigFactory, StageFactory, build, build_from_config};
pub use fake::FakeFilter;

use crate::Error;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Outcome of a lookup at the chain boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The URL is known-bad.
    Flagged,
    /// The URL is not known-bad.
    Clear,
    /// No stage could settle the question.
    Inconclusive,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Flagged => "flagged",
            Verdict::Clear => "clear",
            Verdict::Inconclusive => "inconclusive",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one lookup through (part of) a chain.
///
/// `error` may be set alongside `Flagged` or `Clear` as a diagnostic, e.g. a
/// failed cache back-fill or a degraded pre-filter. It is the verdict, not
/// the presence of an error, that callers act on.
#[derive(Debug)]
pub struct Lookup {
    pub verdict: Verdict,
    pub error: Option<Error>,
}

impl Lookup {
    pub fn flagged() -> Self {
        Self { verdict: Verdict::Flagged, error: None }
    }

    pub fn clear() -> Self {
        Self { verdict: Verdict::Clear, error: None }
    }

    pub fn inconclusive(error: Error) -> Self {
        Self { verdict: Verdict::Inconclusive, error: Some(error) }
    }

    /// Whether the URL was flagged.
    pub fn found(&self) -> bool {
        self.verdict == Verdict::Flagged
    }

    /// Attach an error observed before this result was produced.
    ///
    /// It becomes the surfaced error; a later one it displaces is logged.
    pub fn with_earlier_error(mut self, error: Error) -> Self {
        if let Some(later) = self.error.replace(error) {
            tracing::debug!(error = %later, "superseded by an earlier error in the chain");
        }
        self
    }

    /// Attach an error observed after this result was produced.
    ///
    /// Kept only if nothing was surfaced yet.
    pub fn with_later_error(mut self, error: Error) -> Self {
        match self.error {
            None => self.error = Some(error),
            Some(_) => tracing::debug!(error = %error, "dropping later error, an earlier one is already surfaced"),
        }
        self
    }
}

impl From<Result<bool, Error>> for Lookup {
    fn from(result: Result<bool, Error>) -> Self {
        match result {
            Ok(true) => Lookup::flagged(),
            Ok(false) => Lookup::clear(),
            Err(e) => Lookup::inconclusive(e),
        }
    }
}

/// A chainable stage that identifies malicious URLs.
///
/// Once a chain is built it is read-only: `contains_url` takes `&self` and may
/// run concurrently from many tasks.
#[async_trait]
pub trait Filter: Send + Sync {
    /// Set the chain continuation.
    ///
    /// Stages that need a successor reject `None` with
    /// [`Error::ChainMisconfigured`]; stages that don't use one accept and drop it.
    fn attach_next(&mut self, next: Option<Box<dyn Filter>>) -> Result<(), Error>;

    /// Check whether `url` is flagged.
    async fn contains_url(&self, url: &str) -> Lookup;

    /// Stage label used in logs.
    fn name(&self) -> &str;

    /// Stop background work in this stage and every stage after it.
    ///
    /// Must be idempotent and must not wait on lookups in flight.
    fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(reason: &str) -> Error {
        Error::StoreUnavailable { store: "test".into(), reason: reason.into() }
    }

    #[test]
    fn test_lookup_from_result() {
        assert_eq!(Lookup::from(Ok(true)).verdict, Verdict::Flagged);
        assert_eq!(Lookup::from(Ok(false)).verdict, Verdict::Clear);

        let lookup = Lookup::from(Err(unavailable("down")));
        assert_eq!(lookup.verdict, Verdict::Inconclusive);
        assert!(!lookup.found());
        assert!(lookup.error.is_some());
    }

    #[test]
    fn test_earlier_error_wins() {
        let lookup = Lookup::inconclusive(unavailable("second")).with_earlier_error(unavailable("first"));
        assert_eq!(lookup.verdict, Verdict::Inconclusive);
        assert!(lookup.error.unwrap().to_string().contains("first"));
    }

    #[test]
    fn test_later_error_does_not_displace() {
        let lookup = Lookup::inconclusive(unavailable("first")).with_later_error(unavailable("second"));
        assert!(lookup.error.unwrap().to_string().contains("first"));

        let lookup = Lookup::flagged().with_later_error(unavailable("backfill"));
        assert!(lookup.found());
        assert!(lookup.error.unwrap().to_string().contains("backfill"));
    }

    #[test]
    fn test_errors_never_change_the_verdict() {
        let lookup = Lookup::clear().with_earlier_error(unavailable("degraded"));
        assert_eq!(lookup.verdict, Verdict::Clear);
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::Inconclusive).unwrap(), "\"inconclusive\"");
        assert_eq!(Verdict::Flagged.to_string(), "flagged");
    }
}
