//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{cosine_similarity, HistoryStore, ListingStore};
use crate::types::listing::{Listing, StoredListing};
use crate::types::search::{PreferenceProfile, ResultSnapshot, SearchRecord};

/// In-memory listing and history storage.
///
/// Useful for testing and development. Not suitable for production as data
/// is lost on restart. Ids are assigned in insertion order, which is also
/// the nearest-neighbor tie-break order.
#[derive(Default)]
pub struct MemoryListingStore {
    listings: RwLock<Vec<StoredListing>>,
    searches: RwLock<Vec<(i64, SearchRecord)>>,
    results: RwLock<Vec<(i64, ResultSnapshot)>>,
    profiles: RwLock<HashMap<i64, PreferenceProfile>>,
}

impl MemoryListingStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.listings.write().unwrap().clear();
        self.searches.write().unwrap().clear();
        self.results.write().unwrap().clear();
        self.profiles.write().unwrap().clear();
    }

    /// Number of stored listings.
    pub fn listing_count(&self) -> usize {
        self.listings.read().unwrap().len()
    }

    /// Number of recorded searches.
    pub fn search_count(&self) -> usize {
        self.searches.read().unwrap().len()
    }

    /// Number of recorded result snapshots.
    pub fn result_count(&self) -> usize {
        self.results.read().unwrap().len()
    }

    /// Result snapshots for one search, in insertion order.
    pub fn results_for(&self, search_id: i64) -> Vec<ResultSnapshot> {
        self.results
            .read()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == search_id)
            .map(|(_, snapshot)| snapshot.clone())
            .collect()
    }

    /// A user's stored profile, if any.
    pub fn profile(&self, user_id: i64) -> Option<PreferenceProfile> {
        self.profiles.read().unwrap().get(&user_id).cloned()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn persist(&self, listing: &Listing, embedding: &[f32]) -> StoreResult<StoredListing> {
        let mut listings = self.listings.write().unwrap();
        let stored = StoredListing {
            id: listings.len() as i64 + 1,
            listing: listing.clone(),
            embedding: embedding.to_vec(),
            active: true,
        };
        listings.push(stored.clone());
        Ok(stored)
    }

    async fn nearest_neighbors(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> StoreResult<Vec<StoredListing>> {
        let listings = self.listings.read().unwrap();

        let mut scored: Vec<(f32, &StoredListing)> = listings
            .iter()
            .filter(|stored| stored.active && !stored.embedding.is_empty())
            .map(|stored| (1.0 - cosine_similarity(embedding, &stored.embedding), stored))
            .collect();

        // Stable sort keeps insertion order for equal distances
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, stored)| stored.clone())
            .collect())
    }

    async fn find_by_location(&self, location: &str, k: usize) -> StoreResult<Vec<StoredListing>> {
        let needle = location.to_lowercase();
        Ok(self
            .listings
            .read()
            .unwrap()
            .iter()
            .filter(|stored| {
                stored.active
                    && stored
                        .listing
                        .location
                        .as_deref()
                        .is_some_and(|l| l.to_lowercase().contains(&needle))
            })
            .take(k)
            .cloned()
            .collect())
    }

    async fn set_active(&self, id: i64, active: bool) -> StoreResult<()> {
        let mut listings = self.listings.write().unwrap();
        let stored = listings
            .iter_mut()
            .find(|stored| stored.id == id)
            .ok_or(StoreError::ListingNotFound { id })?;
        stored.active = active;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for MemoryListingStore {
    async fn insert_search(
        &self,
        record: &SearchRecord,
        results: &[ResultSnapshot],
    ) -> StoreResult<i64> {
        // One write-lock scope covers both tables, so the search row and its
        // snapshots land together or not at all
        let mut searches = self.searches.write().unwrap();
        let mut stored_results = self.results.write().unwrap();

        let search_id = searches.len() as i64 + 1;
        searches.push((search_id, record.clone()));
        for snapshot in results {
            stored_results.push((search_id, snapshot.clone()));
        }

        Ok(search_id)
    }

    async fn preference_profile(&self, user_id: i64) -> StoreResult<Option<PreferenceProfile>> {
        Ok(self.profiles.read().unwrap().get(&user_id).cloned())
    }

    async fn upsert_preference_profile(
        &self,
        user_id: i64,
        profile: &PreferenceProfile,
    ) -> StoreResult<()> {
        self.profiles
            .write()
            .unwrap()
            .insert(user_id, profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::intent::ExtractedIntent;

    fn listing(url: &str) -> Listing {
        Listing::new("Mock", url, "Toyota", "Camry")
    }

    #[tokio::test]
    async fn test_nearest_neighbors_orders_by_distance() {
        let store = MemoryListingStore::new();
        store
            .persist(&listing("https://m.test/far"), &[0.0, 1.0, 0.0])
            .await
            .unwrap();
        store
            .persist(&listing("https://m.test/close"), &[1.0, 0.0, 0.0])
            .await
            .unwrap();

        let neighbors = store.nearest_neighbors(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(neighbors[0].listing.url, "https://m.test/close");
        assert_eq!(neighbors[1].listing.url, "https://m.test/far");
    }

    #[tokio::test]
    async fn test_nearest_neighbors_ties_break_by_insertion() {
        let store = MemoryListingStore::new();
        for i in 0..3 {
            store
                .persist(&listing(&format!("https://m.test/{i}")), &[1.0, 0.0])
                .await
                .unwrap();
        }

        let neighbors = store.nearest_neighbors(&[1.0, 0.0], 10).await.unwrap();
        let ids: Vec<i64> = neighbors.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_inactive_listings_are_invisible() {
        let store = MemoryListingStore::new();
        let stored = store
            .persist(&listing("https://m.test/1"), &[1.0, 0.0])
            .await
            .unwrap();
        store.set_active(stored.id, false).await.unwrap();

        let neighbors = store.nearest_neighbors(&[1.0, 0.0], 10).await.unwrap();
        assert!(neighbors.is_empty());
    }

    #[tokio::test]
    async fn test_set_active_unknown_id() {
        let store = MemoryListingStore::new();
        let err = store.set_active(404, false).await.unwrap_err();
        assert!(matches!(err, StoreError::ListingNotFound { id: 404 }));
    }

    #[tokio::test]
    async fn test_find_by_location_is_case_insensitive() {
        let store = MemoryListingStore::new();
        let mut l = listing("https://m.test/1");
        l.location = Some("San Diego, CA".to_string());
        store.persist(&l, &[1.0]).await.unwrap();

        let found = store.find_by_location("san diego", 5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(store.find_by_location("boston", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_search_links_snapshots() {
        let store = MemoryListingStore::new();
        let record = SearchRecord::new(7, "electric suv", vec![0.1], ExtractedIntent::new());
        let snapshots = vec![
            ResultSnapshot {
                listing_id: 1,
                match_score: 98.0,
                rank: 1,
            },
            ResultSnapshot {
                listing_id: 2,
                match_score: 95.0,
                rank: 2,
            },
        ];

        let search_id = store.insert_search(&record, &snapshots).await.unwrap();
        assert_eq!(store.results_for(search_id).len(), 2);
    }
}
