//! Batch persistence - embed each fetched listing and make it durable.

use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::{AiError, StoreError};
use crate::traits::{ai::Ai, store::ListingStore};
use crate::types::config::EMBEDDING_DIM;
use crate::types::listing::{Listing, StoredListing};

/// Result of persisting a fetched batch.
#[derive(Debug, Clone, Default)]
pub struct PersistOutcome {
    /// Listings that made it into the store, in completion order
    pub stored: Vec<StoredListing>,

    /// How many listings were skipped after an embed/store failure
    pub failed: usize,
}

#[derive(Debug, Error)]
enum PersistError {
    #[error("embedding failed: {0}")]
    Embed(#[from] AiError),

    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
}

/// Embed and store every listing in the batch.
///
/// Each listing is an independent task joined at the end: one failure is
/// logged and skipped without touching the rest of the batch. Embedding
/// calls run concurrently under `concurrency` to respect provider rate
/// limits.
pub async fn persist_listings<S, A>(
    listings: &[Listing],
    store: &S,
    ai: &A,
    concurrency: usize,
) -> PersistOutcome
where
    S: ListingStore,
    A: Ai,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let tasks = listings.iter().map(|listing| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            embed_and_store(listing, store, ai).await
        }
    });

    let results = join_all(tasks).await;

    let mut outcome = PersistOutcome::default();
    for (listing, result) in listings.iter().zip(results) {
        match result {
            Ok(stored) => outcome.stored.push(stored),
            Err(e) => {
                warn!(url = %listing.url, error = %e, "listing skipped");
                outcome.failed += 1;
            }
        }
    }

    debug!(
        stored = outcome.stored.len(),
        failed = outcome.failed,
        "batch persisted"
    );
    outcome
}

async fn embed_and_store<S: ListingStore, A: Ai>(
    listing: &Listing,
    store: &S,
    ai: &A,
) -> Result<StoredListing, PersistError> {
    let embedding = ai.embed(&listing.embedding_text()).await?;
    if embedding.len() != EMBEDDING_DIM {
        return Err(PersistError::Embed(AiError::EmbeddingDim {
            expected: EMBEDDING_DIM,
            got: embedding.len(),
        }));
    }

    Ok(store.persist(listing, &embedding).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryListingStore;
    use crate::testing::MockAi;

    fn listing(url: &str, brand: &str) -> Listing {
        Listing::new("Mock", url, brand, "Anything")
    }

    #[tokio::test]
    async fn test_persists_whole_batch() {
        let store = MemoryListingStore::new();
        let ai = MockAi::new();
        let batch = vec![
            listing("https://m.test/1", "Toyota"),
            listing("https://m.test/2", "Honda"),
        ];

        let outcome = persist_listings(&batch, &store, &ai, 5).await;
        assert_eq!(outcome.stored.len(), 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(store.listing_count(), 2);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_rest() {
        let store = MemoryListingStore::new();
        let ai = MockAi::new().with_embed_failure("Edsel");
        let batch = vec![
            listing("https://m.test/1", "Toyota"),
            listing("https://m.test/2", "Edsel"),
            listing("https://m.test/3", "Honda"),
        ];

        let outcome = persist_listings(&batch, &store, &ai, 5).await;
        assert_eq!(outcome.stored.len(), 2);
        assert_eq!(outcome.failed, 1);
        assert!(outcome
            .stored
            .iter()
            .all(|s| s.listing.brand != "Edsel"));
    }

    #[tokio::test]
    async fn test_wrong_dimension_counts_as_failure() {
        let store = MemoryListingStore::new();
        let ai = MockAi::new().with_embedding_dim(8);

        let outcome = persist_listings(&[listing("https://m.test/1", "Kia")], &store, &ai, 5).await;
        assert_eq!(outcome.stored.len(), 0);
        assert_eq!(outcome.failed, 1);
    }
}
