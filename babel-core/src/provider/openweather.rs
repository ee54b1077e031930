use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{Coordinate, WeatherReading};
use crate::provider::truncate_body;

use super::WeatherClient;

const API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Enforced per request so a slow provider degrades instead of blocking.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Condition group assumed when the provider omits the `weather` array.
const DEFAULT_CONDITION_MAIN: &str = "Clear";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: API_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the client at a different endpoint, e.g. a test server.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, coord: Coordinate) -> Result<WeatherReading> {
        let res = self
            .http
            .get(&self.base_url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("lat", coord.lat.to_string()),
                ("lon", coord.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let condition_main = parsed
            .weather
            .first()
            .map(|w| w.main.clone())
            .unwrap_or_else(|| DEFAULT_CONDITION_MAIN.to_string());

        let reading = WeatherReading {
            condition_main,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            cloudiness_pct: parsed.clouds.map(|c| c.all).unwrap_or(0.0),
        };

        debug!(
            main = %reading.condition_main,
            temp = reading.temperature_c,
            humidity = reading.humidity_pct,
            wind = reading.wind_speed,
            clouds = reading.cloudiness_pct,
            "fetched current weather"
        );

        Ok(reading)
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    clouds: Option<OwClouds>,
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn current(&self, coord: Coordinate) -> WeatherReading {
        match self.fetch_current(coord).await {
            Ok(reading) => reading,
            Err(err) => {
                warn!("OpenWeather fetch degraded to unknown reading: {err:#}");
                WeatherReading::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COORD: Coordinate = Coordinate { lat: 13.061, lon: 80.238 };

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::with_base_url("KEY".to_string(), server.uri())
    }

    #[tokio::test]
    async fn parses_current_weather_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{
                    "weather": [ { "main": "Rain", "description": "light rain" } ],
                    "main": { "temp": 24.3, "humidity": 81 },
                    "wind": { "speed": 4.6 },
                    "clouds": { "all": 90 }
                }"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let reading = client_for(&server).current(COORD).await;

        assert_eq!(reading.condition_main, "Rain");
        assert_eq!(reading.temperature_c, 24.3);
        assert_eq!(reading.humidity_pct, 81.0);
        assert_eq!(reading.wind_speed, 4.6);
        assert_eq!(reading.cloudiness_pct, 90.0);
    }

    #[tokio::test]
    async fn empty_weather_array_defaults_to_clear() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{ "weather": [], "main": { "temp": 30.0, "humidity": 40 }, "wind": { "speed": 2.0 } }"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let reading = client_for(&server).current(COORD).await;

        assert_eq!(reading.condition_main, "Clear");
        assert_eq!(reading.cloudiness_pct, 0.0);
    }

    #[tokio::test]
    async fn server_error_degrades_to_unknown_reading() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let reading = client_for(&server).current(COORD).await;
        assert!(reading.is_unknown());
    }

    #[tokio::test]
    async fn malformed_payload_degrades_to_unknown_reading() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let reading = client_for(&server).current(COORD).await;
        assert!(reading.is_unknown());
    }
}
