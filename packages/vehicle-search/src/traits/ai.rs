//! AI trait for NLU extraction and embedding generation.
//!
//! Implementations wrap a specific provider (OpenAI, Anthropic, a local
//! model) and handle the specifics of prompting and response parsing. The
//! pipeline only sees this narrow contract, which keeps the orchestrator
//! testable with deterministic fakes.

use async_trait::async_trait;

use crate::error::AiResult;
use crate::types::intent::ExtractedIntent;

/// NLU and embedding capability consumed by the pipeline.
#[async_trait]
pub trait Ai: Send + Sync {
    /// Extract structured vehicle filters from a free-text query.
    ///
    /// Fields not mentioned in the query must stay absent - implementations
    /// must not fabricate values. A provider outage or an uninterpretable
    /// response is an error; the pipeline treats it as fatal.
    async fn extract_intent(&self, query: &str) -> AiResult<ExtractedIntent>;

    /// Generate an embedding for text.
    ///
    /// The returned vector must have [`crate::EMBEDDING_DIM`] dimensions.
    async fn embed(&self, text: &str) -> AiResult<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Providers with a batch endpoint should override this.
    async fn embed_batch(&self, texts: &[&str]) -> AiResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}
