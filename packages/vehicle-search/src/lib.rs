//! Vehicle Search Pipeline
//!
//! A query-to-ranked-results pipeline for vehicle listings: free text goes
//! in, ranked candidates come out. One run extracts structured intent and a
//! query embedding, gathers candidates from external listing sources
//! concurrently (synthesizing plausible inventory when every source fails),
//! embeds and persists each candidate, ranks them by semantic similarity,
//! and - for authenticated users - records the search and folds the results
//! into a long-lived preference profile.
//!
//! # Failure policy
//!
//! Only feature extraction can fail a search: everything downstream depends
//! on its output. Every other stage degrades instead of erroring - a dead
//! source contributes zero listings, a listing that will not embed is
//! skipped, and a failed preference update is logged and forgotten.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vehicle_search::{AutoTraderAdapter, CarGurusAdapter, SearchPipeline};
//!
//! let pipeline = SearchPipeline::new(
//!     ai,                               // impl Ai (NLU + embeddings)
//!     store,                            // impl ListingStore
//!     history,                          // impl HistoryStore
//!     vec![
//!         Arc::new(AutoTraderAdapter::new()),
//!         Arc::new(CarGurusAdapter::new()),
//!     ],
//! );
//!
//! let outcome = pipeline.run("Electric SUV under $50k", Some(user_id)).await?;
//! for result in outcome.results {
//!     println!("#{} {}% {}", result.rank, result.match_score, result.listing.listing.url);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Ai, SourceAdapter, stores)
//! - [`types`] - Domain types (listings, intent, results, config)
//! - [`pipeline`] - The staged pipeline and its orchestrator
//! - [`sources`] - Source adapters, rate limiting, fallback generation
//! - [`stores`] - Storage implementations (memory, Postgres/pgvector)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod sources;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AiError, FetchError, PipelineError, StoreError};
pub use traits::{
    ai::Ai,
    source::SourceAdapter,
    store::{cosine_similarity, HistoryStore, ListingStore},
};
pub use types::{
    config::{PipelineConfig, EMBEDDING_DIM},
    intent::ExtractedIntent,
    listing::{Listing, StoredListing, VehicleSpecs},
    search::{
        PreferenceProfile, RankedResult, ResultSnapshot, SearchOutcome, SearchRecord,
        MAX_PREFERRED_BRANDS, MAX_PREFERRED_TYPES,
    },
};

// Re-export the pipeline
pub use pipeline::{
    match_score, persist_listings, rank_listings, record_search, PersistOutcome, SearchPipeline,
    SearchState,
};

// Re-export sources
pub use sources::{
    AutoTraderAdapter, CarGurusAdapter, FallbackGenerator, RateLimitedAdapter, SourceFetcher,
};

// Re-export stores
pub use stores::MemoryListingStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresListingStore;
