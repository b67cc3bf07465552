//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline without
//! making real AI or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{AiError, AiResult, FetchError, FetchResult};
use crate::traits::{ai::Ai, source::SourceAdapter};
use crate::types::config::EMBEDDING_DIM;
use crate::types::intent::ExtractedIntent;
use crate::types::listing::Listing;

/// A mock AI implementation for testing.
///
/// Returns deterministic, configurable responses for extraction and
/// embedding. Unconfigured queries extract to an empty intent; unconfigured
/// texts embed to a deterministic vector derived from their hash. Clones
/// share fixtures and call history, so a test can keep a handle for
/// assertions after moving a clone into the pipeline.
#[derive(Clone, Default)]
pub struct MockAi {
    /// Predefined intents by query
    intents: Arc<RwLock<HashMap<String, ExtractedIntent>>>,

    /// Predefined embeddings by text
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Substrings that make `embed` fail
    embed_failures: Arc<RwLock<Vec<String>>>,

    /// Default embedding dimension
    embedding_dim: usize,

    /// Fail every extraction call
    fail_extraction: bool,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAiCall>>>,
}

/// Record of a call made to the mock AI.
#[derive(Debug, Clone)]
pub enum MockAiCall {
    ExtractIntent { query: String },
    Embed { text_len: usize },
}

impl MockAi {
    /// Create a new mock AI with default behavior.
    pub fn new() -> Self {
        Self {
            embedding_dim: EMBEDDING_DIM,
            ..Default::default()
        }
    }

    /// Create a mock whose extraction calls always fail.
    pub fn failing() -> Self {
        Self {
            embedding_dim: EMBEDDING_DIM,
            fail_extraction: true,
            ..Default::default()
        }
    }

    /// Set the embedding dimension.
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Add a predefined intent for a query.
    pub fn with_intent(self, query: impl Into<String>, intent: ExtractedIntent) -> Self {
        self.intents.write().unwrap().insert(query.into(), intent);
        self
    }

    /// Add a predefined embedding for text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Make `embed` fail for any text containing `substring`.
    pub fn with_embed_failure(self, substring: impl Into<String>) -> Self {
        self.embed_failures.write().unwrap().push(substring.into());
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAiCall> {
        self.calls.read().unwrap().clone()
    }

    /// Generate a deterministic embedding based on text.
    fn generate_deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        // Use hash bytes to seed a deterministic embedding in [-1, 1]
        (0..self.embedding_dim)
            .map(|i| {
                let byte = hash[i % 32] as f32;
                (byte / 127.5) - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl Ai for MockAi {
    async fn extract_intent(&self, query: &str) -> AiResult<ExtractedIntent> {
        self.calls.write().unwrap().push(MockAiCall::ExtractIntent {
            query: query.to_string(),
        });

        if self.fail_extraction {
            return Err(AiError::Unavailable("mock extraction outage".into()));
        }

        Ok(self
            .intents
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        self.calls.write().unwrap().push(MockAiCall::Embed {
            text_len: text.len(),
        });

        let failures = self.embed_failures.read().unwrap();
        if failures.iter().any(|s| text.contains(s.as_str())) {
            return Err(AiError::Unavailable("mock embedding outage".into()));
        }

        if let Some(fixture) = self.embeddings.read().unwrap().get(text) {
            return Ok(fixture.clone());
        }

        Ok(self.generate_deterministic_embedding(text))
    }
}

enum MockAdapterMode {
    Respond,
    Fail,
    Hang,
}

/// A mock source adapter for testing.
pub struct MockAdapter {
    name: String,
    listings: Vec<Listing>,
    mode: MockAdapterMode,
    calls: Arc<RwLock<usize>>,
}

impl MockAdapter {
    /// Create an adapter that returns no listings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listings: Vec::new(),
            mode: MockAdapterMode::Respond,
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Create an adapter whose every fetch fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            mode: MockAdapterMode::Fail,
            ..Self::new(name)
        }
    }

    /// Create an adapter that never answers (for timeout tests).
    pub fn hanging(name: impl Into<String>) -> Self {
        Self {
            mode: MockAdapterMode::Hang,
            ..Self::new(name)
        }
    }

    /// Set the listings returned by every fetch.
    pub fn with_listings(mut self, listings: Vec<Listing>) -> Self {
        self.listings = listings;
        self
    }

    /// Number of fetch calls made.
    pub fn call_count(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _intent: &ExtractedIntent, _query: &str) -> FetchResult<Vec<Listing>> {
        *self.calls.write().unwrap() += 1;

        match self.mode {
            MockAdapterMode::Respond => Ok(self.listings.clone()),
            MockAdapterMode::Fail => Err(FetchError::Http("mock source outage".into())),
            MockAdapterMode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}
