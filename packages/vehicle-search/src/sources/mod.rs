//! Source adapters and the aggregate fetcher.
//!
//! Each adapter wraps one external listing site. The [`SourceFetcher`] runs
//! them concurrently with a per-adapter deadline and degrades to synthetic
//! listings from [`FallbackGenerator`] when every source comes back empty.

mod autotrader;
mod cargurus;
mod fallback;
mod fetcher;
mod rate_limited;

pub use autotrader::AutoTraderAdapter;
pub use cargurus::CarGurusAdapter;
pub use fallback::FallbackGenerator;
pub use fetcher::SourceFetcher;
pub use rate_limited::RateLimitedAdapter;

/// Browser-like User-Agent sent by the HTTP adapters.
///
/// Listing sites reject obvious bot agents outright.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
