//! Rate-limited adapter wrapper.
//!
//! Wraps any SourceAdapter with rate limiting using the governor crate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::FetchResult;
use crate::traits::source::SourceAdapter;
use crate::types::intent::ExtractedIntent;
use crate::types::listing::Listing;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// An adapter wrapper that enforces a request rate against its source.
pub struct RateLimitedAdapter<A: SourceAdapter> {
    inner: A,
    limiter: Arc<DefaultRateLimiter>,
}

impl<A: SourceAdapter> RateLimitedAdapter<A> {
    /// Create a new rate-limited adapter.
    ///
    /// # Arguments
    /// * `adapter` - The underlying adapter to wrap
    /// * `requests_per_second` - Maximum requests per second
    pub fn new(adapter: A, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        );
        Self {
            inner: adapter,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create with burst support.
    pub fn with_burst(adapter: A, requests_per_second: u32, burst: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        )
        .allow_burst(NonZeroU32::new(burst).expect("burst must be > 0"));

        Self {
            inner: adapter,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

#[async_trait]
impl<A: SourceAdapter> SourceAdapter for RateLimitedAdapter<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, intent: &ExtractedIntent, query: &str) -> FetchResult<Vec<Listing>> {
        self.limiter.until_ready().await;
        self.inner.fetch(intent, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAdapter;
    use std::time::Instant;

    #[tokio::test]
    async fn test_rate_limiting_spaces_out_calls() {
        let mock = MockAdapter::new("mock").with_listings(vec![]);
        let adapter = RateLimitedAdapter::new(mock, 2);
        let intent = ExtractedIntent::new();

        let start = Instant::now();
        for _ in 0..3 {
            adapter.fetch(&intent, "anything").await.unwrap();
        }
        let elapsed = start.elapsed();

        // 3 calls at 2/sec: first immediate, the rest wait
        assert!(
            elapsed.as_millis() >= 500,
            "rate limiting not applied: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_name_delegates() {
        let adapter = RateLimitedAdapter::new(MockAdapter::new("inner"), 1);
        assert_eq!(adapter.name(), "inner");
    }
}
