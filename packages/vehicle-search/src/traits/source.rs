//! Source adapter trait for external listing sites.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::intent::ExtractedIntent;
use crate::types::listing::Listing;

/// One external listing source.
///
/// Adapters are invoked independently and concurrently by
/// [`crate::sources::SourceFetcher`]; an adapter that fails contributes zero
/// listings and never aborts the aggregate fetch. Implementations should
/// return whatever the source had - filtering and ranking happen downstream.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable source name, e.g. "AutoTrader".
    ///
    /// Stamped onto every listing this adapter produces and used in logs.
    fn name(&self) -> &str;

    /// Fetch candidate listings for the extracted intent.
    ///
    /// `query` is the original free text, available for sources whose search
    /// endpoint takes keywords rather than structured filters.
    async fn fetch(&self, intent: &ExtractedIntent, query: &str) -> FetchResult<Vec<Listing>>;
}
