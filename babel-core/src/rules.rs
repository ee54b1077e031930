//! Rule-based classification of weather readings into condition labels.
//!
//! The rule table is an ordered JSON array; order is priority when scores
//! tie. Each rule may gate on the provider's `main` condition group and may
//! bound any of the four numeric dimensions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::TableError;
use crate::model::WeatherReading;

/// Weather-rule table shipped with the crate.
pub const DEFAULT_RULES_JSON: &str = include_str!("../assets/weather_rules.json");

/// Numeric and categorical criteria for one condition.
///
/// An absent bound is treated as unbounded on that side.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleCriteria {
    /// Provider `main` groups this rule applies to. When present and the
    /// reading's group is not a member, the rule is skipped entirely.
    pub weather_main: Option<Vec<String>>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub wind_min: Option<f64>,
    pub wind_max: Option<f64>,
    pub cloudiness_min: Option<f64>,
    pub cloudiness_max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherRule {
    pub condition: String,
    #[serde(default)]
    pub criteria: RuleCriteria,
}

/// Ordered, immutable rule table. Loaded once at startup.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<WeatherRule>,
}

impl RuleTable {
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let rules = serde_json::from_str(json).map_err(|source| TableError::Parse {
            what: "weather rule table",
            source,
        })?;
        Ok(Self { rules })
    }

    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let json = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Table shipped with the crate.
    pub fn embedded() -> Result<Self, TableError> {
        Self::from_json(DEFAULT_RULES_JSON)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Score every rule against the reading and return the best condition
    /// label.
    ///
    /// A `weather_main` mismatch excludes the rule outright. Otherwise the
    /// rule earns +2 for a main match and +1 per satisfied numeric range.
    /// Only a strictly higher score replaces the current best, so ties keep
    /// the earliest rule. Returns "Unknown" when nothing scores above zero.
    pub fn classify(&self, reading: &WeatherReading) -> String {
        let mut best: Option<&WeatherRule> = None;
        let mut best_score = 0u32;

        for rule in &self.rules {
            let mut score = 0u32;

            if let Some(mains) = &rule.criteria.weather_main {
                let matched = mains
                    .iter()
                    .any(|m| m.eq_ignore_ascii_case(&reading.condition_main));
                if !matched {
                    continue;
                }
                score += 2;
            }

            let c = &rule.criteria;
            score += u32::from(in_range(reading.temperature_c, c.temp_min, c.temp_max));
            score += u32::from(in_range(reading.humidity_pct, c.humidity_min, c.humidity_max));
            score += u32::from(in_range(reading.wind_speed, c.wind_min, c.wind_max));
            score += u32::from(in_range(
                reading.cloudiness_pct,
                c.cloudiness_min,
                c.cloudiness_max,
            ));

            if score > best_score {
                best_score = score;
                best = Some(rule);
            }
        }

        match best {
            Some(rule) => {
                debug!(condition = %rule.condition, score = best_score, "classified reading");
                rule.condition.clone()
            }
            None => WeatherReading::UNKNOWN_CONDITION.to_string(),
        }
    }
}

fn in_range(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    value >= min.unwrap_or(f64::NEG_INFINITY) && value <= max.unwrap_or(f64::INFINITY)
}
