//! AutoTrader listing adapter.
//!
//! Fetches the search results page and reads the schema.org JSON-LD blocks
//! embedded in it. JSON-LD is the most stable surface AutoTrader exposes;
//! the visible markup changes too often to parse.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::sources::USER_AGENT;
use crate::traits::source::SourceAdapter;
use crate::types::intent::ExtractedIntent;
use crate::types::listing::Listing;

const SOURCE_NAME: &str = "AutoTrader";
const DEFAULT_BASE_URL: &str = "https://www.autotrader.com/cars-for-sale/all-cars";

/// Adapter for autotrader.com search results.
pub struct AutoTraderAdapter {
    client: reqwest::Client,
    base_url: String,
    jsonld_block: Regex,
}

impl AutoTraderAdapter {
    /// Create a new adapter against the production site.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create an adapter against a custom base URL (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            jsonld_block: Regex::new(
                r#"(?s)<script[^>]*type="application/ld\+json"[^>]*>(.*?)</script>"#,
            )
            .expect("static regex"),
        }
    }

    /// Build the search URL for an intent.
    fn search_url(&self, intent: &ExtractedIntent, query: &str) -> FetchResult<url::Url> {
        let mut url = url::Url::parse(&self.base_url).map_err(|_| FetchError::InvalidUrl {
            url: self.base_url.clone(),
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(brand) = &intent.brand {
                pairs.append_pair("makeCodeList", &brand.to_uppercase());
            }
            if let Some(model) = &intent.model {
                pairs.append_pair("modelCodeList", model);
            }
            if let Some(min) = intent.price_min {
                pairs.append_pair("minPrice", &(min as i64).to_string());
            }
            if let Some(max) = intent.price_max {
                pairs.append_pair("maxPrice", &(max as i64).to_string());
            }
            if let Some(fuel) = &intent.fuel_type {
                pairs.append_pair("fuelTypeGroup", fuel);
            }
            if let Some(body_type) = &intent.body_type {
                pairs.append_pair("vehicleStyleCodes", body_type);
            }
            if let Some(mileage) = intent.mileage_max {
                pairs.append_pair("maxMileage", &mileage.to_string());
            }
            if intent.is_empty() {
                pairs.append_pair("keywordPhrases", query);
            }
        }

        Ok(url)
    }

    /// Pull vehicle objects out of the page's JSON-LD blocks.
    fn parse_listings(&self, body: &str) -> Vec<Listing> {
        let mut listings = Vec::new();

        for capture in self.jsonld_block.captures_iter(body) {
            let Ok(value) = serde_json::from_str::<Value>(capture[1].trim()) else {
                continue;
            };

            // A block is either one object or an array of them
            let objects = match value {
                Value::Array(items) => items,
                other => vec![other],
            };

            for object in objects {
                let ty = object["@type"].as_str().unwrap_or_default();
                if ty != "Vehicle" && ty != "Car" {
                    continue;
                }
                if let Some(listing) = Self::listing_from_jsonld(&object) {
                    listings.push(listing);
                }
            }
        }

        listings
    }

    fn listing_from_jsonld(object: &Value) -> Option<Listing> {
        let url = object["offers"]["url"]
            .as_str()
            .or_else(|| object["url"].as_str())?;
        let brand = object["brand"]["name"]
            .as_str()
            .or_else(|| object["brand"].as_str())?;
        let model = object["model"].as_str()?;

        let mut listing = Listing::new(SOURCE_NAME, url, brand, model);

        if let Some(year) = object["vehicleModelDate"]
            .as_str()
            .and_then(|y| y.parse::<i32>().ok())
            .or_else(|| object["vehicleModelDate"].as_i64().map(|y| y as i32))
        {
            listing = listing.with_year(year);
        }
        if let Some(price) = object["offers"]["price"]
            .as_f64()
            .or_else(|| object["offers"]["price"].as_str().and_then(|p| p.parse().ok()))
        {
            listing = listing.with_price(price);
        }
        if let Some(mileage) = object["mileageFromOdometer"]["value"].as_i64() {
            listing = listing.with_mileage(mileage);
        }
        if let Some(body_type) = object["bodyType"].as_str() {
            listing = listing.with_body_type(body_type);
        }
        if let Some(fuel_type) = object["fuelType"].as_str() {
            listing = listing.with_fuel_type(fuel_type);
        }
        if let Some(transmission) = object["vehicleTransmission"].as_str() {
            listing = listing.with_transmission(transmission);
        }
        if let Some(color) = object["color"].as_str() {
            listing.colors.push(color.to_string());
        }
        if let Some(description) = object["description"].as_str() {
            listing = listing.with_description(description);
        }
        match &object["image"] {
            Value::String(image) => listing.images.push(image.clone()),
            Value::Array(images) => listing
                .images
                .extend(images.iter().filter_map(|i| i.as_str().map(String::from))),
            _ => {}
        }

        Some(listing)
    }
}

impl Default for AutoTraderAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for AutoTraderAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, intent: &ExtractedIntent, query: &str) -> FetchResult<Vec<Listing>> {
        let url = self.search_url(intent, query)?;
        debug!(url = %url, "fetching AutoTrader results");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(Box::new(std::io::Error::other(format!(
                "AutoTrader returned {}",
                response.status()
            )))));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let listings = self.parse_listings(&body);
        debug!(count = listings.len(), "parsed AutoTrader listings");
        Ok(listings)
    }
}
