//! Terminal stub stage.

use super::{Filter, Lookup};
use crate::Error;
use async_trait::async_trait;

/// A filter that answers from a fixed list of markers.
///
/// Always available and never errors, which makes it a safe chain terminator
/// for setups and tests without a real authoritative store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeFilter {
    markers: Vec<String>,
}

impl FakeFilter {
    /// Flag any URL containing one of `markers`.
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }
}

#[async_trait]
impl Filter for FakeFilter {
    /// Nothing comes after a fake filter, so a successor is accepted and dropped.
    fn attach_next(&mut self, next: Option<Box<dyn Filter>>) -> Result<(), Error> {
        if let Some(next) = next {
            tracing::debug!(dropped = next.name(), "fake filter ignores its secondary filter");
        }
        Ok(())
    }

    async fn contains_url(&self, url: &str) -> Lookup {
        if self.markers.iter().any(|m| url.contains(m.as_str())) {
            Lookup::flagged()
        } else {
            Lookup::clear()
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Verdict;

    fn fake() -> FakeFilter {
        FakeFilter::new(vec!["facebook".into()])
    }

    #[tokio::test]
    async fn test_flags_marked_urls() {
        let f = fake();
        for url in ["www.facebook.com/wjwjw/wdqwd", "facebook.com/pewpewpew", "www.google.ca/facebook"] {
            assert!(f.contains_url(url).await.found(), "{url} should be flagged");
        }
    }

    #[tokio::test]
    async fn test_clears_unmarked_urls() {
        let f = fake();
        for url in ["www.facehook.com", "cisco.com/facehok", "www.netapp.com"] {
            let lookup = f.contains_url(url).await;
            assert_eq!(lookup.verdict, Verdict::Clear, "{url} should be clear");
            assert!(lookup.error.is_none());
        }
    }

    #[tokio::test]
    async fn test_no_markers_clears_everything() {
        let f = FakeFilter::default();
        assert_eq!(f.contains_url("facebook.com").await.verdict, Verdict::Clear);
    }

    #[test]
    fn test_attach_next_does_nothing() {
        let mut f = fake();
        assert!(f.attach_next(Some(Box::new(FakeFilter::default()))).is_ok());
        assert!(f.attach_next(None).is_ok());
        assert_eq!(f, fake());
    }
}
