use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::explore::{
    DEFAULT_CITY_FALLBACK_BOOKS, DEFAULT_KEY_PREFIX, DEFAULT_WEATHER_FALLBACK_BOOKS, FallbackBooks,
};
use crate::geo::GeoBoundsIndex;
use crate::model::BookId;
use crate::rules::RuleTable;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key used for live weather readings.
    pub api_key: Option<String>,

    /// Base URL of the recommendation document store.
    pub store_url: Option<String>,

    /// City prefix stripped from locality keys before store lookups.
    pub key_prefix: String,

    /// Book ids substituted when a locality has no stored record.
    pub fallback_city_books: Vec<BookId>,

    /// Book ids substituted when a weather condition has no stored record.
    pub fallback_weather_books: Vec<BookId>,

    /// Optional override for the embedded locality-bounds table.
    pub localities_file: Option<PathBuf>,

    /// Optional override for the embedded weather-rule table.
    pub weather_rules_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            store_url: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            fallback_city_books: DEFAULT_CITY_FALLBACK_BOOKS.to_vec(),
            fallback_weather_books: DEFAULT_WEATHER_FALLBACK_BOOKS.to_vec(),
            localities_file: None,
            weather_rules_file: None,
        }
    }
}

impl Config {
    /// Configured store base URL, with a hint when absent.
    pub fn store_url(&self) -> Result<&str> {
        self.store_url.as_deref().ok_or_else(|| {
            anyhow!(
                "No recommendation store URL configured.\n\
                 Hint: run `babel configure` and enter the store base URL."
            )
        })
    }

    pub fn fallback_books(&self) -> FallbackBooks {
        FallbackBooks {
            city: self.fallback_city_books.clone(),
            weather: self.fallback_weather_books.clone(),
        }
    }

    /// Locality-bounds table: the configured override file, or the table
    /// embedded in the crate. Malformed tables are fatal at startup.
    pub fn load_geo_index(&self) -> Result<GeoBoundsIndex> {
        match &self.localities_file {
            Some(path) => GeoBoundsIndex::from_file(path)
                .with_context(|| format!("Failed to load locality table: {}", path.display())),
            None => GeoBoundsIndex::embedded().context("Failed to load embedded locality table"),
        }
    }

    /// Weather-rule table, same override semantics as `load_geo_index`.
    pub fn load_rule_table(&self) -> Result<RuleTable> {
        match &self.weather_rules_file {
            Some(path) => RuleTable::from_file(path)
                .with_context(|| format!("Failed to load weather rule table: {}", path.display())),
            None => RuleTable::embedded().context("Failed to load embedded weather rule table"),
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "babel", "babel-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
