//! Ranking - nearest-neighbor retrieval with presentation scores.

use tracing::debug;

use crate::error::StoreResult;
use crate::traits::store::ListingStore;
use crate::types::search::RankedResult;

/// Presentation score for the candidate at `index` (0 = closest neighbor).
///
/// A heuristic over rank position, not a normalized distance: it gives the
/// user a stable, readable percentage without requiring the store to expose
/// calibrated similarity values. Starts at 98, steps down by 3, floors at
/// 70.
pub fn match_score(index: usize) -> f32 {
    (98_i64 - 3 * index as i64).max(70) as f32
}

/// Rank the stored candidates closest to the query embedding.
///
/// Delegates ordering to the store's nearest-neighbor query and decorates
/// the result with dense 1-based ranks and match scores. Fewer than `limit`
/// neighbors is not an error - whatever exists comes back, ranks still
/// dense from 1.
pub async fn rank_listings<S: ListingStore>(
    store: &S,
    query_embedding: &[f32],
    limit: usize,
) -> StoreResult<Vec<RankedResult>> {
    let neighbors = store.nearest_neighbors(query_embedding, limit).await?;

    let ranked: Vec<RankedResult> = neighbors
        .into_iter()
        .enumerate()
        .map(|(index, listing)| RankedResult {
            listing,
            match_score: match_score(index),
            rank: index as u32 + 1,
        })
        .collect();

    debug!(count = ranked.len(), "candidates ranked");
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryListingStore;
    use crate::types::listing::Listing;
    use proptest::prelude::*;

    #[test]
    fn test_score_formula() {
        assert_eq!(match_score(0), 98.0);
        assert_eq!(match_score(1), 95.0);
        assert_eq!(match_score(9), 71.0);
        assert_eq!(match_score(10), 70.0);
        assert_eq!(match_score(14), 70.0);
        assert_eq!(match_score(1000), 70.0);
    }

    #[tokio::test]
    async fn test_ranks_are_dense_from_one() {
        let store = MemoryListingStore::new();
        for i in 0..5 {
            let listing = Listing::new("Mock", format!("https://m.test/{i}"), "Toyota", "Camry");
            store.persist(&listing, &[1.0, i as f32]).await.unwrap();
        }

        let ranked = rank_listings(&store, &[1.0, 0.0], 12).await.unwrap();
        assert_eq!(ranked.len(), 5);
        for (i, result) in ranked.iter().enumerate() {
            assert_eq!(result.rank, i as u32 + 1);
        }
    }

    proptest! {
        #[test]
        fn prop_scores_non_increasing_with_floor(n in 0usize..200) {
            let scores: Vec<f32> = (0..n).map(match_score).collect();
            for pair in scores.windows(2) {
                prop_assert!(pair[0] >= pair[1]);
            }
            for score in scores {
                prop_assert!((70.0..=98.0).contains(&score));
            }
        }
    }
}
