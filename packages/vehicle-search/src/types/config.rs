//! Configuration for the search pipeline.

use std::time::Duration;

/// Dimensionality of all embeddings in the system.
///
/// Query embeddings and listing content embeddings must both match this, and
/// the vector column in the Postgres store is declared with it.
pub const EMBEDDING_DIM: usize = 1536;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum ranked results returned to the caller. Default: 12.
    pub max_results: usize,

    /// Listings synthesized when every adapter comes back empty.
    /// Default: 15.
    pub fallback_count: usize,

    /// Deadline for a single source adapter call.
    ///
    /// Kept strictly shorter than `pipeline_timeout` so one hung source
    /// cannot stall the user-visible request. Default: 20s.
    pub adapter_timeout: Duration,

    /// Deadline for the whole search. Default: 60s.
    pub pipeline_timeout: Duration,

    /// Concurrent listing-embedding calls during persistence.
    ///
    /// Caps pressure on the embedding provider's rate limits. Default: 5.
    pub embed_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_results: 12,
            fallback_count: 15,
            adapter_timeout: Duration::from_secs(20),
            pipeline_timeout: Duration::from_secs(60),
            embed_concurrency: 5,
        }
    }
}

impl PipelineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the fallback listing count.
    pub fn with_fallback_count(mut self, fallback_count: usize) -> Self {
        self.fallback_count = fallback_count;
        self
    }

    /// Set the per-adapter deadline.
    pub fn with_adapter_timeout(mut self, adapter_timeout: Duration) -> Self {
        self.adapter_timeout = adapter_timeout;
        self
    }

    /// Set the overall pipeline deadline.
    pub fn with_pipeline_timeout(mut self, pipeline_timeout: Duration) -> Self {
        self.pipeline_timeout = pipeline_timeout;
        self
    }

    /// Set the embedding concurrency cap.
    pub fn with_embed_concurrency(mut self, embed_concurrency: usize) -> Self {
        self.embed_concurrency = embed_concurrency;
        self
    }
}
