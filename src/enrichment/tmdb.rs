//! HTTP client for The Movie Database (TMDB) v3 API.
//!
//! Titles are resolved from their external title key with the `find`
//! endpoint, then the credits of the matching movie or TV series are split
//! into cast, directors and music contributors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{EnrichmentClient, EnrichmentError, EnrichmentErrorKind};

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

const MUSIC_JOBS: &[&str] = &["Original Music Composer", "Music", "Composer", "Songs"];
const CREDITS_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    movie_results: Vec<FindResult>,
    #[serde(default)]
    tv_results: Vec<FindResult>,
}

#[derive(Debug, Deserialize)]
struct FindResult {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastMember>,
    #[serde(default)]
    crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    name: String,
    #[serde(default)]
    job: String,
    #[serde(default)]
    department: String,
}

/// Contributor names of one title, split by category.
#[derive(Debug, Clone, Default, PartialEq)]
struct TitleCredits {
    cast: Vec<String>,
    directors: Vec<String>,
    music: Vec<String>,
}

impl From<CreditsResponse> for TitleCredits {
    fn from(response: CreditsResponse) -> Self {
        let cast = response.cast.into_iter().map(|c| c.name).collect();
        let mut directors = Vec::new();
        let mut music = Vec::new();
        for member in response.crew {
            if member.job == "Director" {
                directors.push(member.name);
            } else if member.department == "Sound" && MUSIC_JOBS.contains(&member.job.as_str()) {
                music.push(member.name);
            }
        }
        Self {
            cast,
            directors,
            music,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    fn path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

/// Blocking TMDB client.
///
/// Credits are cached per title key so that the three category fetches of a
/// single title hit the network once.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    credits_cache: Mutex<HashMap<String, Arc<TitleCredits>>>,
}

impl TmdbClient {
    /// Create a new TmdbClient.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.themoviedb.org/3")
    /// * `api_key` - v3 API key
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            credits_cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verifies the endpoint is reachable and accepts the API key.
    pub fn check_connection(&self) -> Result<(), EnrichmentError> {
        let _: serde_json::Value = self.get_json("configuration", &[])?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, EnrichmentError> {
        let url = format!("{}/{}", self.base_url, path);
        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .map_err(EnrichmentError::from_reqwest)?;

        let status = response.status();
        debug!(
            "GET {} -> {} in {:.3}s",
            path,
            status,
            started.elapsed().as_secs_f64()
        );
        if !status.is_success() {
            return Err(EnrichmentError::from_status(status, path));
        }

        let body = response.text().map_err(EnrichmentError::from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            EnrichmentError::new(
                EnrichmentErrorKind::Parse,
                format!("Invalid response from {}: {}", path, e),
            )
        })
    }

    fn resolve(&self, title_key: &str) -> Result<(MediaKind, u64), EnrichmentError> {
        let found: FindResponse = self.get_json(
            &format!("find/{}", title_key),
            &[("external_source", "imdb_id")],
        )?;

        if let Some(movie) = found.movie_results.first() {
            return Ok((MediaKind::Movie, movie.id));
        }
        if let Some(tv) = found.tv_results.first() {
            return Ok((MediaKind::Tv, tv.id));
        }
        Err(EnrichmentError::new(
            EnrichmentErrorKind::NotFound,
            format!("No title found for {}", title_key),
        ))
    }

    fn credits(&self, title_key: &str) -> Result<Arc<TitleCredits>, EnrichmentError> {
        if let Some(cached) = self.cached_credits(title_key) {
            return Ok(cached);
        }

        let (kind, id) = self.resolve(title_key)?;
        let response: CreditsResponse =
            self.get_json(&format!("{}/{}/credits", kind.path(), id), &[])?;
        let credits = Arc::new(TitleCredits::from(response));

        if let Ok(mut cache) = self.credits_cache.lock() {
            if cache.len() >= CREDITS_CACHE_CAPACITY {
                cache.clear();
            }
            cache.insert(title_key.to_string(), credits.clone());
        }
        Ok(credits)
    }

    fn cached_credits(&self, title_key: &str) -> Option<Arc<TitleCredits>> {
        self.credits_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(title_key).cloned())
    }
}

impl EnrichmentClient for TmdbClient {
    fn cast(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        Ok(self.credits(title_key)?.cast.clone())
    }

    fn directors(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        Ok(self.credits(title_key)?.directors.clone())
    }

    fn music_contributors(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        Ok(self.credits(title_key)?.music.clone())
    }
}
