use std::fmt::Debug;

use async_trait::async_trait;

use crate::Config;
use crate::model::{Coordinate, WeatherReading};
use crate::provider::openweather::OpenWeatherClient;

pub mod openweather;

/// Source of live weather readings for a coordinate.
///
/// Implementations never fail: any transport or parse problem degrades to
/// `WeatherReading::unknown()`, which downstream classification treats as a
/// terminal outcome. Retry and timeout policy live inside the
/// implementation, not at this seam.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn current(&self, coord: Coordinate) -> WeatherReading;
}

/// Construct the weather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherClient>> {
    let api_key = config.api_key.as_deref().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `babel configure` and enter your API key."
        )
    })?;

    Ok(Box::new(OpenWeatherClient::new(api_key.to_owned())))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = client_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn client_from_config_works_when_key_is_set() {
        let cfg = Config {
            api_key: Some("KEY".to_string()),
            ..Config::default()
        };

        let client = client_from_config(&cfg);
        assert!(client.is_ok());
    }

    #[test]
    fn truncate_body_limits_long_payloads() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert!(truncated.len() < long.len());
        assert!(truncated.ends_with("..."));
    }
}
