//! The orchestrator - one search as a single logical operation.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::error::{AiError, PipelineError, Result};
use crate::pipeline::{persist_listings, rank_listings, record_search};
use crate::sources::SourceFetcher;
use crate::traits::{
    ai::Ai,
    source::SourceAdapter,
    store::{HistoryStore, ListingStore},
};
use crate::types::config::{PipelineConfig, EMBEDDING_DIM};
use crate::types::intent::ExtractedIntent;
use crate::types::listing::{Listing, StoredListing};
use crate::types::search::{RankedResult, SearchOutcome};

/// Accumulating state threaded through one pipeline run.
///
/// Each stage reads what it needs and appends its output; no stage is
/// re-entered. The struct exists mostly for observability - consumers never
/// see it, but it keeps the stage contract explicit.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Original query text
    pub query: String,

    /// Requesting user, if authenticated
    pub user_id: Option<i64>,

    /// Output of the extraction stage
    pub intent: Option<ExtractedIntent>,

    /// Query embedding from the extraction stage
    pub query_embedding: Option<Vec<f32>>,

    /// Output of the fetch stage
    pub fetched: Vec<Listing>,

    /// Output of the persist stage
    pub stored: Vec<StoredListing>,

    /// Output of the rank stage
    pub ranked: Vec<RankedResult>,

    /// Output of the record stage
    pub search_id: Option<i64>,
}

impl SearchState {
    fn new(query: &str, user_id: Option<i64>) -> Self {
        Self {
            query: query.to_string(),
            user_id,
            ..Default::default()
        }
    }
}

/// The full query-to-ranked-results pipeline.
///
/// Stages run in a fixed order: extract -> fetch -> persist -> rank ->
/// record. Only extraction can fail the run; every later stage degrades to
/// fewer items instead of erroring (see the stage modules for the
/// per-stage policy).
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = SearchPipeline::new(ai, store, history, vec![
///     Arc::new(AutoTraderAdapter::new()),
///     Arc::new(CarGurusAdapter::new()),
/// ]);
///
/// let outcome = pipeline.run("Electric SUV under $50k", Some(user_id)).await?;
/// ```
pub struct SearchPipeline<A, S, H> {
    ai: A,
    store: S,
    history: H,
    fetcher: SourceFetcher,
    config: PipelineConfig,
}

impl<A, S, H> SearchPipeline<A, S, H>
where
    A: Ai,
    S: ListingStore,
    H: HistoryStore,
{
    /// Create a pipeline with default configuration.
    pub fn new(ai: A, store: S, history: H, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self::with_config(ai, store, history, adapters, PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(
        ai: A,
        store: S,
        history: H,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        config: PipelineConfig,
    ) -> Self {
        let fetcher = SourceFetcher::new(adapters)
            .with_adapter_timeout(config.adapter_timeout)
            .with_fallback_count(config.fallback_count);

        Self {
            ai,
            store,
            history,
            fetcher,
            config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run a search to completion.
    ///
    /// `user_id` is `None` for guests; their searches are never recorded.
    #[instrument(skip(self), fields(user_id = ?user_id))]
    pub async fn run(&self, query: &str, user_id: Option<i64>) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        match tokio::time::timeout(self.config.pipeline_timeout, self.run_stages(query, user_id))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(PipelineError::Timeout),
        }
    }

    /// Run a search, aborting early if the caller cancels.
    ///
    /// Cancellation drops the in-flight stage, which cancels any pending
    /// adapter and AI calls with it. Listings already persisted stay as
    /// they are - they are reusable inventory for future searches.
    pub async fn run_with_cancel(
        &self,
        query: &str,
        user_id: Option<i64>,
        cancel: CancellationToken,
    ) -> Result<SearchOutcome> {
        tokio::select! {
            outcome = self.run(query, user_id) => outcome,
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        }
    }

    async fn run_stages(&self, query: &str, user_id: Option<i64>) -> Result<SearchOutcome> {
        let mut state = SearchState::new(query, user_id);
        info!(query = %query, "search started");

        // Extracting
        let intent = self
            .ai
            .extract_intent(query)
            .await
            .map_err(PipelineError::Extraction)?;
        let query_embedding = self
            .ai
            .embed(query)
            .await
            .map_err(PipelineError::Extraction)?;
        if query_embedding.len() != EMBEDDING_DIM {
            return Err(PipelineError::Extraction(AiError::EmbeddingDim {
                expected: EMBEDDING_DIM,
                got: query_embedding.len(),
            }));
        }
        state.intent = Some(intent.clone());
        state.query_embedding = Some(query_embedding.clone());

        // Fetching
        state.fetched = self.fetcher.fetch_all(&intent, &state.query).await;
        info!(fetched = state.fetched.len(), "candidates fetched");

        // Persisting
        let outcome = persist_listings(
            &state.fetched,
            &self.store,
            &self.ai,
            self.config.embed_concurrency,
        )
        .await;
        state.stored = outcome.stored;

        // Ranking
        state.ranked =
            rank_listings(&self.store, &query_embedding, self.config.max_results).await?;

        // Recording
        state.search_id = record_search(
            &self.history,
            state.user_id,
            &state.query,
            &query_embedding,
            &intent,
            &state.ranked,
        )
        .await;

        info!(
            results = state.ranked.len(),
            search_id = ?state.search_id,
            "search complete"
        );

        Ok(SearchOutcome {
            results: state.ranked,
            search_id: state.search_id,
        })
    }
}
