//! Storage implementations.
//!
//! - [`MemoryListingStore`]: in-memory, for tests and development
//! - `PostgresListingStore`: production store with pgvector (feature
//!   `postgres`)

mod memory;

#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryListingStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresListingStore;
