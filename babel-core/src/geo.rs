//! Locality resolution from a static table of named bounding boxes.
//!
//! A coordinate is matched in two passes: exact containment first, then a
//! proximity fallback that combines great-circle distance to each region's
//! center with the degree-space distance to its nearest edge.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::TableError;
use crate::model::Coordinate;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Keeps the proximity score finite when a coordinate sits exactly on a
/// region center.
const PROXIMITY_EPSILON: f64 = 0.001;

/// Locality-bounds table shipped with the crate.
pub const DEFAULT_LOCALITIES_JSON: &str = include_str!("../assets/localities.json");

/// A named rectangular geographic region.
#[derive(Debug, Clone)]
pub struct GeoRegion {
    pub name: String,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

#[derive(Debug, Deserialize)]
struct RawBounds {
    lat_min: f64,
    lat_max: f64,
    lng_min: f64,
    lng_max: f64,
}

impl GeoRegion {
    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.lat_min + self.lat_max) / 2.0,
            lon: (self.lng_min + self.lng_max) / 2.0,
        }
    }

    fn contains(&self, coord: Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&coord.lat)
            && (self.lng_min..=self.lng_max).contains(&coord.lon)
    }

    /// Euclidean degree-space distance from `coord` to the nearest point on
    /// the rectangle; zero on an axis whose range already contains the
    /// coordinate.
    fn edge_distance_deg(&self, coord: Coordinate) -> f64 {
        let lat_dist = if coord.lat < self.lat_min {
            self.lat_min - coord.lat
        } else if coord.lat > self.lat_max {
            coord.lat - self.lat_max
        } else {
            0.0
        };

        let lon_dist = if coord.lon < self.lng_min {
            self.lng_min - coord.lon
        } else if coord.lon > self.lng_max {
            coord.lon - self.lng_max
        } else {
            0.0
        };

        lat_dist.hypot(lon_dist)
    }
}

/// Immutable index over the locality-bounds table.
///
/// Loaded once at startup and shared read-only by all callers.
#[derive(Debug, Clone)]
pub struct GeoBoundsIndex {
    regions: Vec<GeoRegion>,
}

impl GeoBoundsIndex {
    /// Parse the table from its JSON object form, keyed by display name.
    ///
    /// Regions are stored sorted by name. The source table iterated a map in
    /// unspecified order; fixing name order makes resolution deterministic
    /// and defines the tie rule when rectangles overlap (first name wins).
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let raw: BTreeMap<String, RawBounds> =
            serde_json::from_str(json).map_err(|source| TableError::Parse {
                what: "locality bounds table",
                source,
            })?;

        let mut regions = Vec::with_capacity(raw.len());
        for (name, bounds) in raw {
            if bounds.lat_min > bounds.lat_max || bounds.lng_min > bounds.lng_max {
                return Err(TableError::InvalidBounds { name });
            }
            regions.push(GeoRegion {
                name,
                lat_min: bounds.lat_min,
                lat_max: bounds.lat_max,
                lng_min: bounds.lng_min,
                lng_max: bounds.lng_max,
            });
        }

        Ok(Self { regions })
    }

    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let json = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Index over the table shipped with the crate.
    pub fn embedded() -> Result<Self, TableError> {
        Self::from_json(DEFAULT_LOCALITIES_JSON)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Resolve a coordinate to a normalized locality key.
    ///
    /// Containment pass first; otherwise the region maximizing
    /// `1 / (center_km + edge_deg + epsilon)` wins. Returns "unknown" only
    /// when the table is empty.
    pub fn resolve_locality(&self, coord: Coordinate) -> String {
        for region in &self.regions {
            if region.contains(coord) {
                debug!(region = %region.name, "coordinate inside region bounds");
                return normalize_locality(&region.name);
            }
        }

        let mut best_name: Option<&str> = None;
        let mut best_score = f64::MIN;

        for region in &self.regions {
            let center_dist = haversine_km(coord, region.center());
            let edge_dist = region.edge_distance_deg(coord);
            let score = 1.0 / (center_dist + edge_dist + PROXIMITY_EPSILON);

            if score > best_score {
                best_score = score;
                best_name = Some(&region.name);
            }
        }

        match best_name {
            Some(name) => {
                debug!(region = %name, score = best_score, "closest region by proximity");
                normalize_locality(name)
            }
            None => "unknown".to_string(),
        }
    }
}

/// Normalize a region display name into its key form.
pub fn normalize_locality(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Great-circle distance in kilometers.
fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(json: &str) -> GeoBoundsIndex {
        GeoBoundsIndex::from_json(json).expect("table should parse")
    }

    #[test]
    fn coordinate_inside_bounds_resolves_directly() {
        let idx = index(
            r#"{ "Guindy": { "lat_min": 13.00, "lat_max": 13.02, "lng_min": 80.20, "lng_max": 80.22 } }"#,
        );

        let locality = idx.resolve_locality(Coordinate { lat: 13.01, lon: 80.21 });
        assert_eq!(locality, "guindy");
    }

    #[test]
    fn resolved_names_are_normalized() {
        let idx = index(
            r#"{ "Red Hills": { "lat_min": 13.18, "lat_max": 13.21, "lng_min": 80.17, "lng_max": 80.20 } }"#,
        );

        let inside = idx.resolve_locality(Coordinate { lat: 13.19, lon: 80.18 });
        assert_eq!(inside, "red_hills");

        // Far away: proximity fallback still lands on the only region.
        let outside = idx.resolve_locality(Coordinate { lat: 12.0, lon: 79.0 });
        assert_eq!(outside, "red_hills");
    }

    #[test]
    fn fallback_picks_nearest_region() {
        let idx = index(
            r#"{
                "Near": { "lat_min": 13.00, "lat_max": 13.02, "lng_min": 80.20, "lng_max": 80.22 },
                "Far":  { "lat_min": 13.50, "lat_max": 13.52, "lng_min": 80.70, "lng_max": 80.72 }
            }"#,
        );

        // Just south of "Near", nowhere close to "Far".
        let locality = idx.resolve_locality(Coordinate { lat: 12.99, lon: 80.21 });
        assert_eq!(locality, "near");
    }

    #[test]
    fn overlapping_regions_resolve_to_first_name_in_order() {
        let idx = index(
            r#"{
                "Beta":  { "lat_min": 13.00, "lat_max": 13.10, "lng_min": 80.20, "lng_max": 80.30 },
                "Alpha": { "lat_min": 13.00, "lat_max": 13.10, "lng_min": 80.20, "lng_max": 80.30 }
            }"#,
        );

        // Identical rectangles: the name-ascending order decides.
        let locality = idx.resolve_locality(Coordinate { lat: 13.05, lon: 80.25 });
        assert_eq!(locality, "alpha");
    }

    #[test]
    fn empty_table_resolves_to_unknown() {
        let idx = index("{}");
        assert!(idx.is_empty());

        let locality = idx.resolve_locality(Coordinate { lat: 13.0, lon: 80.0 });
        assert_eq!(locality, "unknown");
    }

    #[test]
    fn resolution_is_deterministic() {
        let idx = GeoBoundsIndex::embedded().expect("embedded table is valid");
        let coord = Coordinate { lat: 13.061, lon: 80.238 };

        let first = idx.resolve_locality(coord);
        let second = idx.resolve_locality(coord);
        assert_eq!(first, second);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = GeoBoundsIndex::from_json(
            r#"{ "Broken": { "lat_min": 13.02, "lat_max": 13.00, "lng_min": 80.20, "lng_max": 80.22 } }"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("inverted bounds"));
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Chennai to Bangalore, roughly 290 km.
        let chennai = Coordinate { lat: 13.0827, lon: 80.2707 };
        let bangalore = Coordinate { lat: 12.9716, lon: 77.5946 };

        let dist = haversine_km(chennai, bangalore);
        assert!((dist - 290.0).abs() < 10.0, "got {dist} km");
    }
}
