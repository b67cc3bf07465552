//! Aggregate fetch across all configured sources.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::sources::FallbackGenerator;
use crate::traits::source::SourceAdapter;
use crate::types::config::PipelineConfig;
use crate::types::intent::ExtractedIntent;
use crate::types::listing::Listing;

/// Fans a query out to every configured source adapter.
///
/// `fetch_all` never fails: each adapter error or timeout is logged and
/// contributes zero listings, and a fully empty union degrades to synthetic
/// listings instead of an error. Duplicate URLs across adapters are dropped,
/// first adapter in configuration order wins.
pub struct SourceFetcher {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    fallback: FallbackGenerator,
    adapter_timeout: Duration,
    fallback_count: usize,
}

impl SourceFetcher {
    /// Create a fetcher over the given adapters with default tunables.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        let defaults = PipelineConfig::default();
        Self {
            adapters,
            fallback: FallbackGenerator::new(),
            adapter_timeout: defaults.adapter_timeout,
            fallback_count: defaults.fallback_count,
        }
    }

    /// Set the per-adapter deadline.
    pub fn with_adapter_timeout(mut self, adapter_timeout: Duration) -> Self {
        self.adapter_timeout = adapter_timeout;
        self
    }

    /// Set how many listings to synthesize when all sources are empty.
    pub fn with_fallback_count(mut self, fallback_count: usize) -> Self {
        self.fallback_count = fallback_count;
        self
    }

    /// Number of configured adapters.
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Fetch candidate listings from every source concurrently.
    pub async fn fetch_all(&self, intent: &ExtractedIntent, query: &str) -> Vec<Listing> {
        let fetches = self.adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            async move {
                let source = adapter.name().to_string();
                match timeout(self.adapter_timeout, adapter.fetch(intent, query)).await {
                    Ok(Ok(listings)) => {
                        debug!(source = %source, count = listings.len(), "source fetch ok");
                        listings
                    }
                    Ok(Err(e)) => {
                        warn!(source = %source, error = %e, "source fetch failed");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(
                            source = %source,
                            timeout_secs = self.adapter_timeout.as_secs(),
                            "source fetch timed out"
                        );
                        Vec::new()
                    }
                }
            }
        });

        let per_source = join_all(fetches).await;

        let mut seen = HashSet::new();
        let mut listings = Vec::new();
        for listing in per_source.into_iter().flatten() {
            if seen.insert(listing.url.clone()) {
                listings.push(listing);
            } else {
                debug!(url = %listing.url, "duplicate listing dropped");
            }
        }

        if listings.is_empty() {
            info!(
                count = self.fallback_count,
                "all sources empty, synthesizing fallback listings"
            );
            listings = self.fallback.generate(intent, self.fallback_count);
        }

        listings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAdapter;

    fn listing(url: &str) -> Listing {
        Listing::new("Mock", url, "Toyota", "Camry")
    }

    #[tokio::test]
    async fn test_union_across_adapters() {
        let fetcher = SourceFetcher::new(vec![
            Arc::new(MockAdapter::new("a").with_listings(vec![listing("https://a.test/1")])),
            Arc::new(MockAdapter::new("b").with_listings(vec![listing("https://b.test/2")])),
        ]);

        let listings = fetcher
            .fetch_all(&ExtractedIntent::new(), "camry")
            .await;
        assert_eq!(listings.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_urls_first_adapter_wins() {
        let mut first = listing("https://shared.test/1");
        first.source = "a".to_string();
        let mut second = listing("https://shared.test/1");
        second.source = "b".to_string();

        let fetcher = SourceFetcher::new(vec![
            Arc::new(MockAdapter::new("a").with_listings(vec![first])),
            Arc::new(MockAdapter::new("b").with_listings(vec![second])),
        ]);

        let listings = fetcher
            .fetch_all(&ExtractedIntent::new(), "camry")
            .await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].source, "a");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_rest() {
        let fetcher = SourceFetcher::new(vec![
            Arc::new(MockAdapter::failing("broken")),
            Arc::new(MockAdapter::new("ok").with_listings(vec![listing("https://ok.test/1")])),
        ]);

        let listings = fetcher
            .fetch_all(&ExtractedIntent::new(), "camry")
            .await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].url, "https://ok.test/1");
    }

    #[tokio::test]
    async fn test_total_failure_yields_fallback_count() {
        let fetcher = SourceFetcher::new(vec![
            Arc::new(MockAdapter::failing("a")),
            Arc::new(MockAdapter::failing("b")),
        ])
        .with_fallback_count(15);

        let listings = fetcher
            .fetch_all(&ExtractedIntent::new(), "anything")
            .await;
        assert_eq!(listings.len(), 15);
    }

    #[tokio::test]
    async fn test_hung_adapter_is_timed_out() {
        let fetcher = SourceFetcher::new(vec![
            Arc::new(MockAdapter::hanging("slow")),
            Arc::new(MockAdapter::new("fast").with_listings(vec![listing("https://fast.test/1")])),
        ])
        .with_adapter_timeout(Duration::from_millis(50));

        let listings = fetcher
            .fetch_all(&ExtractedIntent::new(), "anything")
            .await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].url, "https://fast.test/1");
    }
}
