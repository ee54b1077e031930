//! Aggregation of city- and weather-keyed book recommendations.
//!
//! The service composes the locality index, the rule classifier, a weather
//! client and the remote store collaborators into the single entry point a
//! screen-level caller invokes. It never returns an error: missing records
//! fall back to configured default id lists, failed lookups degrade, and
//! unresolvable ids are dropped.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::geo::GeoBoundsIndex;
use crate::model::{BookId, BookSummary, Coordinate, ExploreBooks, WeatherReading};
use crate::provider::WeatherClient;
use crate::rules::RuleTable;
use crate::store::{BookCatalog, CityBookLookup, WeatherBookLookup};

/// Ids substituted when a locality has no stored recommendation record.
pub const DEFAULT_CITY_FALLBACK_BOOKS: &[BookId] = &[19, 20, 35, 37, 70, 71];

/// Ids substituted when a weather condition has no stored record.
pub const DEFAULT_WEATHER_FALLBACK_BOOKS: &[BookId] = &[6, 20, 21, 22, 68, 74, 70, 71];

/// City-name prefix stripped from locality keys before store lookups, so
/// "Chennai - Guindy" and "Guindy" address the same record.
pub const DEFAULT_KEY_PREFIX: &str = "chennai - ";

/// Default recommendation id lists used when a key has no stored record.
#[derive(Debug, Clone)]
pub struct FallbackBooks {
    pub city: Vec<BookId>,
    pub weather: Vec<BookId>,
}

impl Default for FallbackBooks {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY_FALLBACK_BOOKS.to_vec(),
            weather: DEFAULT_WEATHER_FALLBACK_BOOKS.to_vec(),
        }
    }
}

pub struct ExploreService {
    geo: GeoBoundsIndex,
    rules: RuleTable,
    weather: Arc<dyn WeatherClient>,
    cities: Arc<dyn CityBookLookup>,
    conditions: Arc<dyn WeatherBookLookup>,
    catalog: Arc<dyn BookCatalog>,
    fallback: FallbackBooks,
    key_prefix: String,
}

impl ExploreService {
    pub fn new(
        geo: GeoBoundsIndex,
        rules: RuleTable,
        weather: Arc<dyn WeatherClient>,
        cities: Arc<dyn CityBookLookup>,
        conditions: Arc<dyn WeatherBookLookup>,
        catalog: Arc<dyn BookCatalog>,
    ) -> Self {
        Self {
            geo,
            rules,
            weather,
            cities,
            conditions,
            catalog,
            fallback: FallbackBooks::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackBooks) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into().to_lowercase();
        self
    }

    /// Normalize a key into the format recommendation records are stored
    /// under: trimmed, lowercased, city prefix stripped, spaces replaced
    /// with underscores. Idempotent.
    pub fn normalize_key(&self, key: &str) -> String {
        key.trim()
            .to_lowercase()
            .replace(self.key_prefix.as_str(), "")
            .replace(' ', "_")
    }

    /// Books recommended for a locality. Missing record or failed lookup
    /// substitutes the configured city fallback ids.
    pub async fn city_books(&self, locality: &str) -> Vec<BookSummary> {
        let key = self.normalize_key(locality);

        let ids = match self.cities.city_book_ids(&key).await {
            Ok(Some(ids)) => ids,
            Ok(None) => {
                debug!(%key, "no city recommendation record, using fallback ids");
                self.fallback.city.clone()
            }
            Err(err) => {
                warn!(%key, "city recommendation lookup failed, using fallback ids: {err:#}");
                self.fallback.city.clone()
            }
        };

        self.resolve_books(ids).await
    }

    /// Books recommended for a weather condition. Same fallback semantics as
    /// `city_books`.
    pub async fn weather_books(&self, condition: &str) -> Vec<BookSummary> {
        let key = self.normalize_key(condition);

        let ids = match self.conditions.weather_book_ids(&key).await {
            Ok(Some(ids)) => ids,
            Ok(None) => {
                debug!(%key, "no weather recommendation record, using fallback ids");
                self.fallback.weather.clone()
            }
            Err(err) => {
                warn!(%key, "weather recommendation lookup failed, using fallback ids: {err:#}");
                self.fallback.weather.clone()
            }
        };

        self.resolve_books(ids).await
    }

    /// Resolve ids into catalog records with concurrent fan-out.
    ///
    /// Waits for every lookup; ids that error or no longer exist are
    /// dropped, so the result length is at most the id count.
    async fn resolve_books(&self, ids: Vec<BookId>) -> Vec<BookSummary> {
        if ids.is_empty() {
            return Vec::new();
        }

        let lookups = ids.iter().map(|&id| self.catalog.book(id));
        join_all(lookups)
            .await
            .into_iter()
            .zip(ids)
            .filter_map(|(result, id)| match result {
                Ok(Some(book)) => Some(book),
                Ok(None) => {
                    debug!(id, "book id did not resolve, dropping");
                    None
                }
                Err(err) => {
                    warn!(id, "book lookup failed, dropping: {err:#}");
                    None
                }
            })
            .collect()
    }

    /// Composed entry point: geolocate, fetch weather, classify, then fetch
    /// both recommendation lists concurrently.
    pub async fn explore(&self, coord: Coordinate) -> ExploreBooks {
        let locality = self.geo.resolve_locality(coord);
        let reading = self.weather.current(coord).await;

        // A failed fetch is already terminal; classifying the zeroed
        // sentinel through the rule table would invent a condition.
        let condition = if reading.is_unknown() {
            WeatherReading::UNKNOWN_CONDITION.to_string()
        } else {
            self.rules.classify(&reading)
        };

        debug!(%locality, %condition, "resolved explore context");

        let (city_books, weather_books) =
            tokio::join!(self.city_books(&locality), self.weather_books(&condition));

        ExploreBooks {
            locality,
            condition,
            city_books,
            weather_books,
        }
    }
}
