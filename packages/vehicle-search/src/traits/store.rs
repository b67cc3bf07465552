//! Storage traits for listings and search history.
//!
//! The storage layer is split into focused traits:
//! - `ListingStore`: durable listings with vector retrieval
//! - `HistoryStore`: search history and preference profiles

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::listing::{Listing, StoredListing};
use crate::types::search::{PreferenceProfile, ResultSnapshot, SearchRecord};

/// Durable listing storage with nearest-neighbor retrieval.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Write a listing with its content embedding, returning the stored row.
    ///
    /// Each call is isolated: callers persisting a batch may skip individual
    /// failures without aborting the rest.
    async fn persist(&self, listing: &Listing, embedding: &[f32]) -> StoreResult<StoredListing>;

    /// Return up to `k` active listings ordered by ascending vector distance
    /// to `embedding`.
    ///
    /// Only rows with `active = true` and a non-null embedding are
    /// considered; distance ties break by insertion order.
    async fn nearest_neighbors(&self, embedding: &[f32], k: usize)
        -> StoreResult<Vec<StoredListing>>;

    /// Return up to `k` active listings whose location matches `location`
    /// (case-insensitive substring).
    async fn find_by_location(&self, location: &str, k: usize) -> StoreResult<Vec<StoredListing>>;

    /// Flip a listing's soft-retirement flag.
    async fn set_active(&self, id: i64, active: bool) -> StoreResult<()>;
}

/// Search history and preference persistence.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert a search row and its result snapshots, returning the search id.
    ///
    /// The search row must exist before any snapshot row referencing it, and
    /// the whole write is atomic: either the search and all its snapshots
    /// land, or nothing does.
    async fn insert_search(
        &self,
        record: &SearchRecord,
        results: &[ResultSnapshot],
    ) -> StoreResult<i64>;

    /// Load a user's preference profile, if one exists.
    async fn preference_profile(&self, user_id: i64) -> StoreResult<Option<PreferenceProfile>>;

    /// Create or replace a user's preference profile.
    async fn upsert_preference_profile(
        &self,
        user_id: i64,
        profile: &PreferenceProfile,
    ) -> StoreResult<()>;
}

// Shared-handle impls so a request handler and the pipeline can hold the
// same store.
#[async_trait]
impl<T: ListingStore + ?Sized> ListingStore for std::sync::Arc<T> {
    async fn persist(&self, listing: &Listing, embedding: &[f32]) -> StoreResult<StoredListing> {
        (**self).persist(listing, embedding).await
    }

    async fn nearest_neighbors(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> StoreResult<Vec<StoredListing>> {
        (**self).nearest_neighbors(embedding, k).await
    }

    async fn find_by_location(&self, location: &str, k: usize) -> StoreResult<Vec<StoredListing>> {
        (**self).find_by_location(location, k).await
    }

    async fn set_active(&self, id: i64, active: bool) -> StoreResult<()> {
        (**self).set_active(id, active).await
    }
}

#[async_trait]
impl<T: HistoryStore + ?Sized> HistoryStore for std::sync::Arc<T> {
    async fn insert_search(
        &self,
        record: &SearchRecord,
        results: &[ResultSnapshot],
    ) -> StoreResult<i64> {
        (**self).insert_search(record, results).await
    }

    async fn preference_profile(&self, user_id: i64) -> StoreResult<Option<PreferenceProfile>> {
        (**self).preference_profile(user_id).await
    }

    async fn upsert_preference_profile(
        &self,
        user_id: i64,
        profile: &PreferenceProfile,
    ) -> StoreResult<()> {
        (**self).upsert_preference_profile(user_id, profile).await
    }
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
