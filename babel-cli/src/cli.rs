use std::sync::Arc;

use clap::{Parser, Subcommand};

use babel_core::provider::client_from_config;
use babel_core::store::rest::RestBookStore;
use babel_core::{BookSummary, Config, Coordinate, ExploreService, WeatherClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "babel", version, about = "Location and weather based book recommendations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and recommendation store URL.
    Configure,

    /// Show book recommendations for a coordinate.
    Explore {
        /// Latitude in decimal degrees.
        #[arg(long, default_value_t = 13.061)]
        lat: f64,

        /// Longitude in decimal degrees.
        #[arg(long, default_value_t = 80.238)]
        lon: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Explore { lat, lon } => explore(Coordinate { lat, lon }).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:").prompt()?;
    let store_url = inquire::Text::new("Recommendation store base URL:").prompt()?;

    config.api_key = Some(api_key.trim().to_string());
    config.store_url = Some(store_url.trim().trim_end_matches('/').to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn explore(coord: Coordinate) -> anyhow::Result<()> {
    let config = Config::load()?;

    // Table problems are fatal here, before any network traffic.
    let geo = config.load_geo_index()?;
    let rules = config.load_rule_table()?;

    let weather: Arc<dyn WeatherClient> = client_from_config(&config)?.into();
    let store = Arc::new(RestBookStore::new(config.store_url()?));

    let service = ExploreService::new(geo, rules, weather, store.clone(), store.clone(), store)
        .with_fallback(config.fallback_books())
        .with_key_prefix(config.key_prefix.clone());

    let result = service.explore(coord).await;

    println!("Locality:  {}", result.locality);
    println!("Condition: {}", result.condition);
    print_books("Books for your neighbourhood", &result.city_books);
    print_books("Books for this weather", &result.weather_books);

    Ok(())
}

fn print_books(heading: &str, books: &[BookSummary]) {
    println!("\n{heading}:");

    if books.is_empty() {
        println!("  (no recommendations)");
        return;
    }

    for book in books {
        let authors = if book.authors.is_empty() {
            "unknown author".to_string()
        } else {
            book.authors.join(", ")
        };

        match book.average_rating {
            Some(rating) => println!("  {} by {authors} ({rating:.1})", book.title),
            None => println!("  {} by {authors}", book.title),
        }
    }
}
