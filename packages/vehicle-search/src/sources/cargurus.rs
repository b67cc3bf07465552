//! CarGurus listing adapter.
//!
//! CarGurus renders results client-side from a JSON payload bootstrapped
//! into the page. The adapter captures that payload's `listings` array
//! instead of touching the DOM.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::sources::USER_AGENT;
use crate::traits::source::SourceAdapter;
use crate::types::intent::ExtractedIntent;
use crate::types::listing::Listing;

const SOURCE_NAME: &str = "CarGurus";
const DEFAULT_BASE_URL: &str =
    "https://www.cargurus.com/Cars/inventorylisting/viewDetailsFilterViewInventoryListing.action";
const LISTING_URL: &str = "https://www.cargurus.com/Cars/inventorylisting/vdp.action";

/// Adapter for cargurus.com search results.
pub struct CarGurusAdapter {
    client: reqwest::Client,
    base_url: String,
    listings_payload: Regex,
}

impl CarGurusAdapter {
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
            listings_payload: Regex::new(r#"(?s)"listings"\s*:\s*(\[.*?\])\s*[,}]"#)
                .expect("static regex"),
        }
    }

    fn search_url(&self, intent: &ExtractedIntent, query: &str) -> FetchResult<url::Url> {
        let mut url = url::Url::parse(&self.base_url).map_err(|_| FetchError::InvalidUrl {
            url: self.base_url.clone(),
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("sourceContext", "carGurusHomePageModel");
            if let Some(brand) = &intent.brand {
                pairs.append_pair("entitySelectingHelper.selectedEntity", brand);
            }
            if let Some(max) = intent.price_max {
                pairs.append_pair("maxPrice", &(max as i64).to_string());
            }
            if let Some(min) = intent.price_min {
                pairs.append_pair("minPrice", &(min as i64).to_string());
            }
            if let Some(location) = &intent.location {
                pairs.append_pair("zip", location);
            }
            if intent.brand.is_none() {
                pairs.append_pair("searchText", query);
            }
        }

        Ok(url)
    }

    /// Extract the bootstrapped `listings` array from the page body.
    ///
    /// A page without the payload is an empty result (the site serves
    /// zero-result pages that way); a payload that will not parse is a
    /// [`FetchError::Parse`].
    fn parse_listings(&self, body: &str) -> FetchResult<Vec<Listing>> {
        let Some(capture) = self.listings_payload.captures(body) else {
            return Ok(Vec::new());
        };
        let items = match serde_json::from_str::<Value>(&capture[1]) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                return Err(FetchError::Parse {
                    reason: "listings payload is not an array".to_string(),
                })
            }
            Err(e) => {
                return Err(FetchError::Parse {
                    reason: e.to_string(),
                })
            }
        };

        Ok(items
            .iter()
            .filter_map(Self::listing_from_payload)
            .collect())
    }

    fn listing_from_payload(item: &Value) -> Option<Listing> {
        let id = item["id"].as_i64()?;
        let brand = item["makeName"].as_str()?;
        let model = item["modelName"].as_str()?;

        let url = format!("{LISTING_URL}?listingId={id}");
        let mut listing = Listing::new(SOURCE_NAME, url, brand, model);

        if let Some(year) = item["carYear"].as_i64() {
            listing = listing.with_year(year as i32);
        }
        if let Some(price) = item["price"].as_f64() {
            listing = listing.with_price(price);
        }
        if let Some(mileage) = item["mileage"].as_i64() {
            listing = listing.with_mileage(mileage);
        }
        if let Some(city) = item["sellerCity"].as_str() {
            listing = listing.with_location(city);
        }
        if let Some(dealer) = item["serviceProviderName"].as_str() {
            listing = listing.with_dealer(dealer, None, None);
        }
        if let Some(body_type) = item["bodyTypeName"].as_str() {
            listing = listing.with_body_type(body_type);
        }
        if let Some(fuel_type) = item["localizedFuelType"].as_str() {
            listing = listing.with_fuel_type(fuel_type);
        }
        if let Some(transmission) = item["localizedTransmission"].as_str() {
            listing = listing.with_transmission(transmission);
        }
        if let Some(color) = item["localizedExteriorColor"].as_str() {
            listing.colors.push(color.to_string());
        }
        if let Some(picture) = item["mainPictureUrl"].as_str() {
            listing.images.push(picture.to_string());
        }

        Some(listing)
    }
}

impl Default for CarGurusAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for CarGurusAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, intent: &ExtractedIntent, query: &str) -> FetchResult<Vec<Listing>> {
        let url = self.search_url(intent, query)?;
        debug!(url = %url, "fetching CarGurus results");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(Box::new(std::io::Error::other(format!(
                "CarGurus returned {}",
                response.status()
            )))));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let listings = self.parse_listings(&body)?;
        debug!(count = listings.len(), "parsed CarGurus listings");
        Ok(listings)
    }
}
