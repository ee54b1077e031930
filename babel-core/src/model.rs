use serde::{Deserialize, Serialize};

/// Identifier of a book in the catalog.
pub type BookId = i64;

/// A geographic point, produced per location query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A single ambient weather observation, as consumed by the rule classifier.
///
/// Not persisted; produced per fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub condition_main: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed: f64,
    pub cloudiness_pct: f64,
}

impl WeatherReading {
    /// Condition label used when no reading could be obtained or classified.
    pub const UNKNOWN_CONDITION: &'static str = "Unknown";

    /// Sentinel reading returned when the weather fetch fails.
    ///
    /// Callers treat "Unknown" as a valid, terminal classification outcome,
    /// not something to retry.
    pub fn unknown() -> Self {
        Self {
            condition_main: Self::UNKNOWN_CONDITION.to_string(),
            temperature_c: 0.0,
            humidity_pct: 0.0,
            wind_speed: 0.0,
            cloudiness_pct: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.condition_main == Self::UNKNOWN_CONDITION
    }
}

/// Book record as stored in the catalog collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Aggregated result of an explore request.
#[derive(Debug, Clone)]
pub struct ExploreBooks {
    /// Normalized locality key the coordinate resolved to.
    pub locality: String,
    /// Classified weather condition label.
    pub condition: String,
    pub city_books: Vec<BookSummary>,
    pub weather_books: Vec<BookSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_reading_is_flagged() {
        let reading = WeatherReading::unknown();
        assert!(reading.is_unknown());
        assert_eq!(reading.condition_main, "Unknown");
    }

    #[test]
    fn book_summary_parses_catalog_document() {
        let json = r#"{
            "id": 19,
            "title": "The Palace of Illusions",
            "authors": ["Chitra Banerjee Divakaruni"],
            "averageRating": 4.1,
            "coverImage": "https://example.com/19.jpg",
            "pageCount": 360
        }"#;

        let book: BookSummary = serde_json::from_str(json).expect("valid catalog document");
        assert_eq!(book.id, 19);
        assert_eq!(book.average_rating, Some(4.1));
        assert_eq!(book.subtitle, None);
        assert_eq!(book.language, None);
    }
}
