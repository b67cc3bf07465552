//! Synthetic listing generation for total source failure.
//!
//! Listing sites are third-party pages with unstable markup; when every
//! adapter fails or returns nothing, the pipeline still needs candidates to
//! rank. The generator produces plausible inventory seeded from whatever the
//! intent did specify, so synthetic results stay on-topic.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::types::intent::ExtractedIntent;
use crate::types::listing::{Listing, VehicleSpecs};

const BRANDS: &[(&str, &[&str])] = &[
    ("Toyota", &["Camry", "RAV4", "Corolla"]),
    ("Honda", &["Accord", "CR-V", "Civic"]),
    ("BMW", &["3 Series", "X5", "i4"]),
    ("Tesla", &["Model 3", "Model Y", "Model S"]),
    ("Ford", &["F-150", "Escape", "Mustang"]),
];

const BODY_TYPES: &[&str] = &["Sedan", "SUV", "Truck", "Coupe"];

const FUEL_TYPES: &[&str] = &["Gasoline", "Hybrid", "Electric"];

const TRANSMISSIONS: &[&str] = &["Automatic", "Manual"];

const COLORS: &[&str] = &["Black", "White", "Silver", "Blue", "Red"];

const CITIES: &[&str] = &[
    "Los Angeles, CA",
    "San Francisco, CA",
    "San Diego, CA",
    "Sacramento, CA",
    "San Jose, CA",
];

const DEALERS: &[&str] = &[
    "Premium Auto Sales",
    "Elite Motors",
    "Luxury Car Center",
    "AutoMax Dealership",
    "Victory Auto Group",
];

const FEATURES: &[&str] = &[
    "Leather Seats",
    "Sunroof",
    "Navigation",
    "Backup Camera",
    "Heated Seats",
    "Apple CarPlay",
    "Blind Spot Monitor",
];

const IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1617814076367-b759c7d7e738?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1616455579100-2e5c926cc9c2?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1614200187524-dc4b892acf16?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1606664515524-ed2f786a0bd6?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1552519507-da3b142c6e3d?w=800&h=600&fit=crop",
];

/// Generates plausible synthetic listings when all sources fail.
#[derive(Debug, Clone, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self
    }

    /// Synthesize `count` listings honoring the intent's filters.
    pub fn generate(&self, intent: &ExtractedIntent, count: usize) -> Vec<Listing> {
        let mut rng = rand::rng();
        let listings: Vec<Listing> = (0..count)
            .map(|index| self.generate_one(intent, index, &mut rng))
            .collect();

        debug!(count = listings.len(), "generated fallback listings");
        listings
    }

    fn generate_one(
        &self,
        intent: &ExtractedIntent,
        index: usize,
        rng: &mut impl Rng,
    ) -> Listing {
        let (pool_brand, pool_models) = BRANDS.choose(rng).expect("non-empty pool");
        let brand = intent.brand.clone().unwrap_or_else(|| pool_brand.to_string());
        let model = intent
            .model
            .clone()
            .unwrap_or_else(|| pool_models.choose(rng).expect("non-empty pool").to_string());
        let body_type = intent
            .body_type
            .clone()
            .unwrap_or_else(|| BODY_TYPES.choose(rng).expect("non-empty pool").to_string());
        let fuel_type = intent
            .fuel_type
            .clone()
            .unwrap_or_else(|| FUEL_TYPES.choose(rng).expect("non-empty pool").to_string());

        // Keep the price inside the requested bounds when they exist
        let lo = intent.price_min.unwrap_or(20_000.0) as i64;
        let hi = (intent.price_max.unwrap_or(60_000.0) as i64).max(lo + 1);
        let price = rng.random_range(lo..=hi) as f64;

        let year = rng.random_range(2018..=2024);
        let mileage = rng.random_range(10_000..=80_000);
        let city = CITIES.choose(rng).expect("non-empty pool");
        let dealer = DEALERS.choose(rng).expect("non-empty pool");
        let phone = format!(
            "+1 ({}) {}-{}",
            rng.random_range(200..=999),
            rng.random_range(200..=999),
            rng.random_range(1000..=9999)
        );
        let address = format!("{} Auto Plaza, {city}", rng.random_range(100..=9999));

        let feature_count = rng.random_range(3..=5);
        let mut features: Vec<String> = FEATURES
            .choose_multiple(rng, feature_count)
            .map(|f| f.to_string())
            .collect();
        // Requested features always show up in what we synthesize
        for wanted in &intent.desired_features {
            if !features.iter().any(|f| f.eq_ignore_ascii_case(wanted)) {
                features.push(wanted.clone());
            }
        }

        let specs = VehicleSpecs {
            acceleration: Some((rng.random_range(50..=100) as f32) / 10.0),
            top_speed: Some(rng.random_range(120..=180)),
            power: Some(rng.random_range(150..=400)),
            engine: None,
            mpg: Some((rng.random_range(200..=450) as f32) / 10.0),
        };

        Listing::new(
            "Fallback",
            format!(
                "https://listings.searchauto.app/fallback/{index}-{}",
                rng.random_range(100_000..=999_999)
            ),
            brand.clone(),
            model.clone(),
        )
        .with_year(year)
        .with_price(price)
        .with_mileage(mileage)
        .with_location(*city)
        .with_dealer(*dealer, Some(phone), Some(address))
        .with_body_type(body_type.clone())
        .with_fuel_type(fuel_type)
        .with_transmission(*TRANSMISSIONS.choose(rng).expect("non-empty pool"))
        .with_specs(specs)
        .with_features(features)
        .with_description(format!(
            "{year} {brand} {model} {body_type} in excellent condition"
        ))
        .with_images([*IMAGES.choose(rng).expect("non-empty pool")])
        .with_colors([*COLORS.choose(rng).expect("non-empty pool")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_count() {
        let generator = FallbackGenerator::new();
        let listings = generator.generate(&ExtractedIntent::new(), 15);
        assert_eq!(listings.len(), 15);
    }

    #[test]
    fn test_urls_are_unique() {
        let generator = FallbackGenerator::new();
        let listings = generator.generate(&ExtractedIntent::new(), 15);

        let mut urls: Vec<&str> = listings.iter().map(|l| l.url.as_str()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), 15);
    }

    #[test]
    fn test_honors_intent_filters() {
        let generator = FallbackGenerator::new();
        let intent = ExtractedIntent::new()
            .with_brand("Tesla")
            .with_body_type("SUV")
            .with_fuel_type("Electric")
            .with_price_range(None, Some(50_000.0))
            .with_features(["Autopilot"]);

        for listing in generator.generate(&intent, 10) {
            assert_eq!(listing.brand, "Tesla");
            assert_eq!(listing.body_type.as_deref(), Some("SUV"));
            assert_eq!(listing.fuel_type.as_deref(), Some("Electric"));
            assert!(listing.price.unwrap() <= 50_000.0);
            assert!(listing
                .features
                .iter()
                .any(|f| f.eq_ignore_ascii_case("Autopilot")));
        }
    }

    #[test]
    fn test_every_listing_has_dealer_identity() {
        let generator = FallbackGenerator::new();
        for listing in generator.generate(&ExtractedIntent::new(), 5) {
            assert!(listing.dealer_name.is_some());
            assert!(listing.dealer_phone.is_some());
            assert!(listing.dealer_address.is_some());
        }
    }
}
