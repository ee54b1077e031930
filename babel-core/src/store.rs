use async_trait::async_trait;

use crate::model::{BookId, BookSummary};

pub mod rest;

/// Lookup of stored book-id lists keyed by normalized locality.
///
/// `Ok(None)` means no record exists for the key; the aggregator substitutes
/// its fallback list. Errors are transport problems and are also degraded to
/// the fallback by the caller.
#[async_trait]
pub trait CityBookLookup: Send + Sync {
    async fn city_book_ids(&self, key: &str) -> anyhow::Result<Option<Vec<BookId>>>;
}

/// Lookup of stored book-id lists keyed by normalized weather condition.
#[async_trait]
pub trait WeatherBookLookup: Send + Sync {
    async fn weather_book_ids(&self, key: &str) -> anyhow::Result<Option<Vec<BookId>>>;
}

/// Resolution of a book id into its catalog record.
///
/// `Ok(None)` means the book no longer exists; the aggregator drops it from
/// the result.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    async fn book(&self, id: BookId) -> anyhow::Result<Option<BookSummary>>;
}
