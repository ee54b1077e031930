//! REST-backed document store for recommendation records and the book
//! catalog.
//!
//! Three logical collections hang off one base URL:
//! `locationRecommendations/{key}`, `weatherRecommendations/{key}` and
//! `books/{id}`. A missing document is a 404, not an error.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::model::{BookId, BookSummary};
use crate::provider::truncate_body;
use crate::store::{BookCatalog, CityBookLookup, WeatherBookLookup};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RestBookStore {
    base_url: String,
    http: Client,
}

/// Recommendation record: an ordered list of book ids under one key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationDoc {
    #[serde(default)]
    book_ids: Vec<BookId>,
}

impl RestBookStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get_document<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "fetching store document");

        let res = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to send request to store: {url}"))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read store response body: {url}"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Store request {} failed with status {}: {}",
                url,
                status,
                truncate_body(&body),
            ));
        }

        let parsed = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse store document at {url}"))?;

        Ok(Some(parsed))
    }
}

#[async_trait]
impl CityBookLookup for RestBookStore {
    async fn city_book_ids(&self, key: &str) -> Result<Option<Vec<BookId>>> {
        let doc: Option<RecommendationDoc> = self
            .get_document(&format!("locationRecommendations/{key}"))
            .await?;
        Ok(doc.map(|d| d.book_ids))
    }
}

#[async_trait]
impl WeatherBookLookup for RestBookStore {
    async fn weather_book_ids(&self, key: &str) -> Result<Option<Vec<BookId>>> {
        let doc: Option<RecommendationDoc> = self
            .get_document(&format!("weatherRecommendations/{key}"))
            .await?;
        Ok(doc.map(|d| d.book_ids))
    }
}

#[async_trait]
impl BookCatalog for RestBookStore {
    async fn book(&self, id: BookId) -> Result<Option<BookSummary>> {
        self.get_document(&format!("books/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_recommendation_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/locationRecommendations/guindy"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{ "bookIds": [19, 20, 35] }"#, "application/json"),
            )
            .mount(&server)
            .await;

        let store = RestBookStore::new(server.uri());
        let ids = store.city_book_ids("guindy").await.expect("lookup succeeds");

        assert_eq!(ids, Some(vec![19, 20, 35]));
    }

    #[tokio::test]
    async fn missing_document_is_none_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = RestBookStore::new(server.uri());

        let city = store.city_book_ids("nowhere").await.expect("404 is not an error");
        assert_eq!(city, None);

        let weather = store.weather_book_ids("unknown").await.expect("404 is not an error");
        assert_eq!(weather, None);

        let book = store.book(999).await.expect("404 is not an error");
        assert!(book.is_none());
    }

    #[tokio::test]
    async fn reads_book_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/books/19"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{ "id": 19, "title": "Ponniyin Selvan", "authors": ["Kalki"], "averageRating": 4.6 }"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let store = RestBookStore::new(server.uri());
        let book = store.book(19).await.expect("lookup succeeds").expect("book exists");

        assert_eq!(book.title, "Ponniyin Selvan");
        assert_eq!(book.average_rating, Some(4.6));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = RestBookStore::new(server.uri());
        let err = store.city_book_ids("guindy").await.unwrap_err();

        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let store = RestBookStore::new("http://example.com/api/");
        assert_eq!(store.base_url, "http://example.com/api");
    }
}
