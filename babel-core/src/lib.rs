//! Core library for the `babel` CLI.
//!
//! This crate defines:
//! - Locality resolution over a static table of geographic bounding boxes
//! - Weather fetching and rule-based condition classification
//! - Book recommendation aggregation with per-source fallback lists
//! - Configuration handling
//!
//! It is used by `babel-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod explore;
pub mod geo;
pub mod model;
pub mod provider;
pub mod rules;
pub mod store;

pub use config::Config;
pub use error::TableError;
pub use explore::{ExploreService, FallbackBooks};
pub use geo::GeoBoundsIndex;
pub use model::{BookId, BookSummary, Coordinate, ExploreBooks, WeatherReading};
pub use provider::WeatherClient;
pub use rules::RuleTable;
pub use store::{BookCatalog, CityBookLookup, WeatherBookLookup};
