//! Structured intent extracted from a free-text query.

use serde::{Deserialize, Serialize};

/// Filters extracted once per query by the NLU capability.
///
/// Every field is optional: absent means "not mentioned", never a fabricated
/// zero value. The struct is immutable after extraction; stages downstream
/// only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIntent {
    /// Manufacturer, e.g. "Toyota"
    pub brand: Option<String>,

    /// Model, e.g. "Camry"
    pub model: Option<String>,

    /// Body style, e.g. "SUV", "Sedan"
    pub body_type: Option<String>,

    /// Oldest acceptable model year
    pub year_min: Option<i32>,

    /// Newest acceptable model year
    pub year_max: Option<i32>,

    /// Lower price bound in dollars
    pub price_min: Option<f64>,

    /// Upper price bound in dollars
    pub price_max: Option<f64>,

    /// Maximum acceptable mileage
    pub mileage_max: Option<i64>,

    /// Fuel type, e.g. "Electric", "Hybrid"
    pub fuel_type: Option<String>,

    /// Location mentioned in the query
    pub location: Option<String>,

    /// Requested features, e.g. ["sunroof", "leather seats"]
    #[serde(default)]
    pub desired_features: Vec<String>,
}

impl ExtractedIntent {
    /// Create an empty intent (nothing extracted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the body type.
    pub fn with_body_type(mut self, body_type: impl Into<String>) -> Self {
        self.body_type = Some(body_type.into());
        self
    }

    /// Set the fuel type.
    pub fn with_fuel_type(mut self, fuel_type: impl Into<String>) -> Self {
        self.fuel_type = Some(fuel_type.into());
        self
    }

    /// Set the price bounds.
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    /// Add desired features.
    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.desired_features
            .extend(features.into_iter().map(|f| f.into()));
        self
    }

    /// True if no field was extracted at all.
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.model.is_none()
            && self.body_type.is_none()
            && self.year_min.is_none()
            && self.year_max.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.mileage_max.is_none()
            && self.fuel_type.is_none()
            && self.location.is_none()
            && self.desired_features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_intent() {
        assert!(ExtractedIntent::new().is_empty());
        assert!(!ExtractedIntent::new().with_brand("Tesla").is_empty());
    }

    #[test]
    fn test_absent_fields_stay_absent_through_serde() {
        let intent = ExtractedIntent::new().with_brand("BMW");
        let json = serde_json::to_string(&intent).unwrap();
        let back: ExtractedIntent = serde_json::from_str(&json).unwrap();

        assert_eq!(back.brand.as_deref(), Some("BMW"));
        assert_eq!(back.price_max, None);
        assert_eq!(back.year_min, None);
    }
}
