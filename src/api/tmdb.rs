//! TMDB (The Movie Database) API client
//!
//! Discover pages filtered by original language, single-movie details, and a
//! status probe for poster images.
//! API docs: https://developer.themoviedb.org/docs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::MovieCatalog;
use crate::models::{poster_url, DiscoverEntry, DiscoverPage, Movie, MovieId, IMAGE_BASE_URL};

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Rate limited (429), retries exhausted")]
    RateLimited,

    #[error("API responded with status: {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// TMDB API client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    image_base_url: String,
    language: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.themoviedb.org/3")
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            image_base_url: IMAGE_BASE_URL.to_string(),
            language: "hi".to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
        }
    }

    /// Override the poster image host
    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = image_base_url.into();
        self
    }

    /// Original language filter for discover (ISO 639-1, default `hi`)
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Make an authenticated GET request with retry logic for rate limits
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str())])
                .query(params)
                .header("Accept", "application/json")
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await?;
                    return serde_json::from_str(&body).map_err(|e| {
                        TmdbError::InvalidResponse(format!("JSON parse error: {}", e))
                    });
                }
                StatusCode::NOT_FOUND => {
                    return Err(TmdbError::NotFound);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    retries += 1;
                    if retries >= self.max_retries {
                        return Err(TmdbError::RateLimited);
                    }

                    // Retry-After header, else exponential backoff
                    let wait_secs = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(2u64.pow(retries));

                    tracing::debug!(endpoint, wait_secs, "tmdb rate limited, backing off");
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                    continue;
                }
                status => {
                    return Err(TmdbError::Status(status.as_u16()));
                }
            }
        }
    }

    /// Discover movies in the configured original language
    pub async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError> {
        let params = [
            ("with_original_language", self.language.clone()),
            ("page", page.to_string()),
        ];
        let response: DiscoverResponse = self.get("/discover/movie", &params).await?;
        Ok(response.into_page())
    }

    /// Get a single movie's display details
    pub async fn movie(&self, id: MovieId) -> Result<Movie, TmdbError> {
        let endpoint = format!("/movie/{}", id);
        let response: MovieResponse = self.get(&endpoint, &[]).await?;
        response.into_movie(id)
    }

    /// Poster URL on this client's image host
    pub fn poster_url(&self, poster_path: &str) -> String {
        poster_url(&self.image_base_url, poster_path)
    }

    /// Check whether a poster image can be loaded
    pub async fn poster_available(&self, poster_path: &str) -> bool {
        let url = self.poster_url(poster_path);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(%url, error = %e, "poster probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError> {
        TmdbClient::discover(self, page).await
    }

    async fn movie(&self, id: MovieId) -> Result<Movie, TmdbError> {
        TmdbClient::movie(self, id).await
    }

    async fn poster_available(&self, poster_path: &str) -> bool {
        TmdbClient::poster_available(self, poster_path).await
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    results: Vec<DiscoverRaw>,
}

impl DiscoverResponse {
    fn into_page(self) -> DiscoverPage {
        DiscoverPage {
            page: self.page,
            total_pages: self.total_pages,
            entries: self.results.into_iter().map(|r| r.into_entry()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiscoverRaw {
    id: MovieId,
    title: Option<String>,
    original_title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    vote_average: Option<f32>,
}

impl DiscoverRaw {
    fn into_entry(self) -> DiscoverEntry {
        DiscoverEntry {
            id: self.id,
            title: self.title.or(self.original_title).unwrap_or_default(),
            year: self.release_date.as_deref().and_then(extract_year),
            poster_path: self.poster_path,
            vote_average: self.vote_average.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: Option<MovieId>,
    title: Option<String>,
    original_title: Option<String>,
    poster_path: Option<String>,
}

impl MovieResponse {
    fn into_movie(self, requested: MovieId) -> Result<Movie, TmdbError> {
        let title = self
            .title
            .or(self.original_title)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TmdbError::InvalidResponse("movie has no title".into()))?;

        Ok(Movie {
            id: self.id.unwrap_or(requested),
            title,
            poster_path: self.poster_path.filter(|p| !p.is_empty()),
        })
    }
}

/// Extract year from a date string like "2022-03-04"
fn extract_year(date: &str) -> Option<u16> {
    date.get(..4).and_then(|y| y.parse().ok())
}
