//! Typed errors for the search pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! The taxonomy mirrors the pipeline's failure policy: only
//! [`PipelineError::Extraction`] aborts a search. Adapter and per-listing
//! failures stay inside their stage and degrade to fewer results; preference
//! updates are best-effort and never surface at all.

use thiserror::Error;

/// Errors that abort a search request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Query text was empty or whitespace-only
    #[error("query must not be empty")]
    EmptyQuery,

    /// Feature extraction or query embedding failed.
    ///
    /// Fatal: every downstream stage depends on the extracted intent and
    /// query embedding, so there is no degraded continuation.
    #[error("feature extraction failed: {0}")]
    Extraction(#[source] AiError),

    /// Storage operation failed while reading ranked candidates
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The overall pipeline deadline elapsed
    #[error("search timed out")]
    Timeout,

    /// The caller cancelled the request
    #[error("search cancelled")]
    Cancelled,
}

/// Errors from the NLU/embedding capability.
#[derive(Debug, Error)]
pub enum AiError {
    /// Provider unreachable or returned a transport-level error
    #[error("AI service unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider responded but the payload could not be interpreted
    #[error("malformed AI response: {reason}")]
    MalformedResponse { reason: String },

    /// Embedding length did not match the indexed dimensionality
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    EmbeddingDim { expected: usize, got: usize },
}

/// Errors from a single source adapter.
///
/// These never escape [`crate::sources::SourceFetcher::fetch_all`]; each one
/// is logged and converted into zero listings from that adapter.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Per-adapter deadline elapsed
    #[error("timeout fetching from {source_name}")]
    Timeout { source_name: String },

    /// Response body could not be parsed into listings
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// Adapter was configured with or produced an invalid URL
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimited,
}

/// Errors from the listing/history stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No listing with the given id
    #[error("listing not found: {id}")]
    ListingNotFound { id: i64 },

    /// Row payload could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for AI capability calls.
pub type AiResult<T> = std::result::Result<T, AiError>;

/// Result type alias for source adapter calls.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
