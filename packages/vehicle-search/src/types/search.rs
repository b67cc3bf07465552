//! Search results, history records, and the per-user preference profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::intent::ExtractedIntent;
use crate::types::listing::StoredListing;

/// Maximum number of brands kept in a preference profile.
pub const MAX_PREFERRED_BRANDS: usize = 10;

/// Maximum number of body types kept in a preference profile.
pub const MAX_PREFERRED_TYPES: usize = 5;

/// One ranked candidate returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    /// The stored listing
    pub listing: StoredListing,

    /// Presentation score in 70..=98, non-increasing with rank
    pub match_score: f32,

    /// 1-based dense rank
    pub rank: u32,
}

/// A search to be recorded in history (authenticated users only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Owning user
    pub user_id: i64,

    /// Original query text
    pub query_text: String,

    /// Query embedding as used for ranking
    pub query_embedding: Vec<f32>,

    /// Intent extracted from the query
    pub intent: ExtractedIntent,

    /// When the search ran
    pub created_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Create a record for a user's search.
    pub fn new(
        user_id: i64,
        query_text: impl Into<String>,
        query_embedding: Vec<f32>,
        intent: ExtractedIntent,
    ) -> Self {
        Self {
            user_id,
            query_text: query_text.into(),
            query_embedding,
            intent,
            created_at: Utc::now(),
        }
    }
}

/// Snapshot row linking a search to one ranked listing.
///
/// Written exactly once, atomically with the search row it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSnapshot {
    /// Stored listing id
    pub listing_id: i64,

    /// Score at the time of the search
    pub match_score: f32,

    /// Rank at the time of the search
    pub rank: u32,
}

/// What a completed pipeline run hands back to the caller.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Ranked candidates, best first
    pub results: Vec<RankedResult>,

    /// History row id; `None` for guests and when recording failed
    pub search_id: Option<i64>,
}

/// Per-user long-lived preferences, folded from search results.
///
/// The only entity in the system with merge-based updates. Brand and type
/// lists are most-recent-first, de-duplicated, and capped on every write;
/// price bounds and features are last-seen values from the extracted intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Up to [`MAX_PREFERRED_BRANDS`] brands, most recent first
    #[serde(default)]
    pub preferred_brands: Vec<String>,

    /// Up to [`MAX_PREFERRED_TYPES`] body types, most recent first
    #[serde(default)]
    pub preferred_types: Vec<String>,

    /// Last-seen lower price bound
    pub price_range_min: Option<f64>,

    /// Last-seen upper price bound
    pub price_range_max: Option<f64>,

    /// Last-seen requested features
    #[serde(default)]
    pub preferred_features: Vec<String>,
}

impl PreferenceProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed brand at the front of the list.
    ///
    /// An already-present brand is moved, not duplicated; entries past the
    /// cap are dropped oldest-first.
    pub fn observe_brand(&mut self, brand: &str) {
        observe(&mut self.preferred_brands, brand, MAX_PREFERRED_BRANDS);
    }

    /// Record an observed body type at the front of the list.
    pub fn observe_type(&mut self, body_type: &str) {
        observe(&mut self.preferred_types, body_type, MAX_PREFERRED_TYPES);
    }

    /// Carry forward the price bounds and feature list from an intent.
    ///
    /// Bounds are last-seen: a search without one leaves the previous value.
    pub fn apply_intent(&mut self, intent: &ExtractedIntent) {
        if intent.price_min.is_some() {
            self.price_range_min = intent.price_min;
        }
        if intent.price_max.is_some() {
            self.price_range_max = intent.price_max;
        }
        if !intent.desired_features.is_empty() {
            self.preferred_features = intent.desired_features.clone();
        }
    }
}

fn observe(list: &mut Vec<String>, value: &str, cap: usize) {
    if let Some(pos) = list.iter().position(|v| v.eq_ignore_ascii_case(value)) {
        list.remove(pos);
    }
    list.insert(0, value.to_string());
    list.truncate(cap);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_brand_never_duplicates() {
        let mut profile = PreferenceProfile::new();
        profile.observe_brand("Tesla");
        profile.observe_brand("Tesla");
        profile.observe_brand("tesla");

        assert_eq!(profile.preferred_brands, vec!["tesla"]);
    }

    #[test]
    fn test_observe_is_most_recent_first() {
        let mut profile = PreferenceProfile::new();
        profile.observe_brand("Toyota");
        profile.observe_brand("Honda");
        profile.observe_brand("Toyota");

        assert_eq!(profile.preferred_brands, vec!["Toyota", "Honda"]);
    }

    #[test]
    fn test_brand_cap_drops_oldest() {
        let mut profile = PreferenceProfile::new();
        for i in 0..12 {
            profile.observe_brand(&format!("Brand{i}"));
        }

        assert_eq!(profile.preferred_brands.len(), MAX_PREFERRED_BRANDS);
        assert_eq!(profile.preferred_brands[0], "Brand11");
        // Brand0 and Brand1 fell off the end
        assert!(!profile.preferred_brands.contains(&"Brand0".to_string()));
        assert!(!profile.preferred_brands.contains(&"Brand1".to_string()));
    }

    #[test]
    fn test_type_cap_is_five() {
        let mut profile = PreferenceProfile::new();
        for i in 0..7 {
            profile.observe_type(&format!("Type{i}"));
        }
        assert_eq!(profile.preferred_types.len(), MAX_PREFERRED_TYPES);
    }

    #[test]
    fn test_apply_intent_keeps_previous_bounds_when_absent() {
        let mut profile = PreferenceProfile::new();
        profile.apply_intent(
            &ExtractedIntent::new().with_price_range(Some(10_000.0), Some(50_000.0)),
        );
        profile.apply_intent(&ExtractedIntent::new().with_brand("Ford"));

        assert_eq!(profile.price_range_min, Some(10_000.0));
        assert_eq!(profile.price_range_max, Some(50_000.0));
    }
}
