use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;

const TMDB_API: &str = "https://api.themoviedb.org/3";

/// Errors specific to talking to the TMDB catalog.
#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("TMDB API error: {status} - {body}")]
    Api { status: StatusCode, body: String },

    #[error("TMDB response for movie {0} is not a movie record")]
    MalformedRecord(u64),
}

/// Source of raw movie records.
///
/// The batch fetcher only depends on this contract, which keeps retry and
/// fan-out behavior testable without touching the network.
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Retrieves the full record for one movie, including its credits block.
    async fn fetch_movie(&self, movie_id: u64) -> Result<Map<String, Value>>;
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Creates a client against the production TMDB endpoint.
    pub fn new(api_key: String, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: TMDB_API.to_string(),
            api_key,
        })
    }

    /// Overrides the API endpoint, for self-hosted mirrors and tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_movie(&self, movie_id: u64) -> Result<Map<String, Value>, TmdbError> {
        let url = format!("{}/movie/{}", self.base_url, movie_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TmdbError::Api { status, body });
        }

        let record: Value = response.json().await?;

        // A 2xx with an unexpected body is still a failed fetch: the record
        // must be a mapping that carries its own id.
        match record {
            Value::Object(map) if map.contains_key("id") => Ok(map),
            _ => Err(TmdbError::MalformedRecord(movie_id)),
        }
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn fetch_movie(&self, movie_id: u64) -> Result<Map<String, Value>> {
        Ok(self.get_movie(movie_id).await?)
    }
}
