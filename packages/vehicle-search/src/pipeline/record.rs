//! History recording - search rows, result snapshots, preference learning.

use tracing::{debug, warn};

use crate::traits::store::HistoryStore;
use crate::types::intent::ExtractedIntent;
use crate::types::search::{PreferenceProfile, RankedResult, ResultSnapshot, SearchRecord};

/// Record a completed search for an authenticated user.
///
/// Guests are a no-op: no search row, no snapshots, no profile. For users,
/// the search row and its result snapshots are written atomically first;
/// preference learning runs after and is best-effort - its failure is
/// logged and never invalidates the recorded search or the returned
/// results.
pub async fn record_search<H: HistoryStore>(
    history: &H,
    user_id: Option<i64>,
    query: &str,
    query_embedding: &[f32],
    intent: &ExtractedIntent,
    results: &[RankedResult],
) -> Option<i64> {
    let Some(user_id) = user_id else {
        debug!("guest search, history skipped");
        return None;
    };

    let record = SearchRecord::new(user_id, query, query_embedding.to_vec(), intent.clone());
    let snapshots: Vec<ResultSnapshot> = results
        .iter()
        .map(|result| ResultSnapshot {
            listing_id: result.listing.id,
            match_score: result.match_score,
            rank: result.rank,
        })
        .collect();

    let search_id = match history.insert_search(&record, &snapshots).await {
        Ok(id) => id,
        Err(e) => {
            warn!(user_id, error = %e, "failed to record search");
            return None;
        }
    };

    update_preferences(history, user_id, intent, results).await;

    debug!(user_id, search_id, "search recorded");
    Some(search_id)
}

/// Fold this search's observations into the user's profile.
async fn update_preferences<H: HistoryStore>(
    history: &H,
    user_id: i64,
    intent: &ExtractedIntent,
    results: &[RankedResult],
) {
    let mut profile = match history.preference_profile(user_id).await {
        Ok(existing) => existing.unwrap_or_default(),
        Err(e) => {
            warn!(user_id, error = %e, "failed to load preference profile");
            return;
        }
    };

    fold_results(&mut profile, intent, results);

    if let Err(e) = history.upsert_preference_profile(user_id, &profile).await {
        warn!(user_id, error = %e, "failed to update preference profile");
    }
}

/// Merge one search's results and intent into a profile.
///
/// Results are folded worst-rank first so that after the pass the
/// best-ranked brands and types of this search sit at the front of the
/// most-recent-first lists.
pub(crate) fn fold_results(
    profile: &mut PreferenceProfile,
    intent: &ExtractedIntent,
    results: &[RankedResult],
) {
    for result in results.iter().rev() {
        profile.observe_brand(&result.listing.listing.brand);
        if let Some(body_type) = &result.listing.listing.body_type {
            profile.observe_type(body_type);
        }
    }
    profile.apply_intent(intent);
}
