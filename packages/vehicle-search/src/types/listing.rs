//! Listing types - fetched candidates and stored rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Performance and efficiency figures scraped from a listing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpecs {
    /// 0-60 mph time in seconds
    pub acceleration: Option<f32>,

    /// Top speed in mph
    pub top_speed: Option<i32>,

    /// Power in horsepower
    pub power: Option<i32>,

    /// Engine description, e.g. "2.5L I4"
    pub engine: Option<String>,

    /// Combined fuel economy in mpg
    pub mpg: Option<f32>,
}

/// A candidate vehicle produced by a source adapter or the fallback
/// generator.
///
/// Listings are value objects until persisted; [`StoredListing`] is the
/// durable form. A listing is never mutated after persistence - a changed
/// listing is a new record, and retirement happens through the stored row's
/// `active` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Name of the source that produced this listing, e.g. "AutoTrader"
    pub source: String,

    /// Canonical listing URL at the source
    pub url: String,

    /// Manufacturer
    pub brand: String,

    /// Model
    pub model: String,

    /// Model year
    pub year: Option<i32>,

    /// Price as shown to the user, e.g. "$42,500"
    pub price_display: String,

    /// Numeric price in dollars, when the source exposes one
    pub price: Option<f64>,

    /// Mileage as shown to the user, e.g. "32,000 mi"
    pub mileage_display: Option<String>,

    /// Numeric mileage
    pub mileage: Option<i64>,

    /// City/region of the vehicle
    pub location: Option<String>,

    /// Selling dealer name
    pub dealer_name: Option<String>,

    /// Selling dealer phone
    pub dealer_phone: Option<String>,

    /// Selling dealer address
    pub dealer_address: Option<String>,

    /// Body style, e.g. "SUV"
    pub body_type: Option<String>,

    /// Fuel type, e.g. "Electric"
    pub fuel_type: Option<String>,

    /// Transmission, e.g. "Automatic"
    pub transmission: Option<String>,

    /// Exterior/interior colors
    #[serde(default)]
    pub colors: Vec<String>,

    /// Performance spec block
    #[serde(default)]
    pub specs: VehicleSpecs,

    /// Equipment and options
    #[serde(default)]
    pub features: Vec<String>,

    /// Free-text description from the source
    pub description: Option<String>,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// When the listing was fetched/synthesized
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Create a new listing with the required identity fields.
    pub fn new(
        source: impl Into<String>,
        url: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            url: url.into(),
            brand: brand.into(),
            model: model.into(),
            year: None,
            price_display: String::new(),
            price: None,
            mileage_display: None,
            mileage: None,
            location: None,
            dealer_name: None,
            dealer_phone: None,
            dealer_address: None,
            body_type: None,
            fuel_type: None,
            transmission: None,
            colors: Vec::new(),
            specs: VehicleSpecs::default(),
            features: Vec::new(),
            description: None,
            images: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the model year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the numeric price and derive the display string.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self.price_display = format_price(price);
        self
    }

    /// Set the numeric mileage and derive the display string.
    pub fn with_mileage(mut self, mileage: i64) -> Self {
        self.mileage = Some(mileage);
        self.mileage_display = Some(format!("{} mi", group_thousands(mileage)));
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the dealer identity.
    pub fn with_dealer(
        mut self,
        name: impl Into<String>,
        phone: Option<String>,
        address: Option<String>,
    ) -> Self {
        self.dealer_name = Some(name.into());
        self.dealer_phone = phone;
        self.dealer_address = address;
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

    /// Set the transmission.
    pub fn with_transmission(mut self, transmission: impl Into<String>) -> Self {
        self.transmission = Some(transmission.into());
        self
    }

    /// Set the spec block.
    pub fn with_specs(mut self, specs: VehicleSpecs) -> Self {
        self.specs = specs;
        self
    }

    /// Add colors.
    pub fn with_colors(mut self, colors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.colors.extend(colors.into_iter().map(|c| c.into()));
        self
    }

    /// Add features.
    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features.extend(features.into_iter().map(|f| f.into()));
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add image URLs.
    pub fn with_images(mut self, images: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.images.extend(images.into_iter().map(|i| i.into()));
        self
    }

    /// Canonical text representation used to derive the content embedding.
    ///
    /// Field order is fixed so that identical vehicles embed identically.
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![
            format!("Brand: {}", self.brand),
            format!("Model: {}", self.model),
        ];
        if let Some(body_type) = &self.body_type {
            parts.push(format!("Type: {body_type}"));
        }
        if let Some(year) = self.year {
            parts.push(format!("Year: {year}"));
        }
        if let Some(fuel_type) = &self.fuel_type {
            parts.push(format!("Fuel: {fuel_type}"));
        }
        if !self.features.is_empty() {
            parts.push(format!("Features: {}", self.features.join(", ")));
        }
        if let Some(description) = &self.description {
            parts.push(format!("Description: {description}"));
        }
        parts.join(" | ")
    }
}

/// A listing made durable by the store, with its content embedding attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredListing {
    /// Row id assigned by the store
    pub id: i64,

    /// The listing as it was persisted
    pub listing: Listing,

    /// Content embedding computed at persist time; never recomputed in place
    pub embedding: Vec<f32>,

    /// Soft-retirement flag; inactive rows are invisible to ranking
    pub active: bool,
}

/// Format a dollar amount the way listing sites display it.
pub fn format_price(price: f64) -> String {
    format!("${}", group_thousands(price.round() as i64))
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_formatting() {
        assert_eq!(format_price(42500.0), "$42,500");
        assert_eq!(format_price(999.0), "$999");
        assert_eq!(format_price(1_250_000.0), "$1,250,000");
    }

    #[test]
    fn test_embedding_text_is_stable() {
        let listing = Listing::new("AutoTrader", "https://autotrader.com/l/1", "Tesla", "Model Y")
            .with_year(2023)
            .with_body_type("SUV")
            .with_features(["Autopilot", "Glass Roof"]);

        let text = listing.embedding_text();
        assert_eq!(
            text,
            "Brand: Tesla | Model: Model Y | Type: SUV | Year: 2023 | Features: Autopilot, Glass Roof"
        );
        // Same fields, same text
        assert_eq!(text, listing.clone().embedding_text());
    }

    #[test]
    fn test_mileage_display_derived() {
        let listing = Listing::new("CarGurus", "https://cargurus.com/l/2", "Honda", "Accord")
            .with_mileage(32000);
        assert_eq!(listing.mileage_display.as_deref(), Some("32,000 mi"));
    }
}
