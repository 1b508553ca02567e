//! TMDB metadata client.

use super::{MetadataProvider, MovieDetails};
use crate::config::MetadataSettings;
use crate::error::{CineMindError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// Client for the TMDB search API.
pub struct TmdbClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    /// Create a client from metadata settings and a resolved API key.
    ///
    /// `api_key` is `Settings::metadata_api_key()` — config value or the
    /// TMDB_API_KEY environment variable. None leaves the client
    /// unconfigured and enrichment disabled.
    pub fn new(settings: &MetadataSettings, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: settings.base_url.clone(),
            image_base_url: settings.image_base_url.clone(),
        }
    }

    /// Build a full poster URL from a TMDB poster path.
    fn poster_url(&self, poster_path: &str) -> Option<String> {
        Url::parse(&format!("{}{}", self.image_base_url, poster_path))
            .map(|u| u.to_string())
            .ok()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    poster_path: Option<String>,
    vote_average: Option<f32>,
    overview: Option<String>,
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self), fields(title = %title))]
    async fn lookup(&self, title: &str, year: Option<&str>) -> Result<Option<MovieDetails>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| CineMindError::Metadata("TMDB API key not configured".to_string()))?;

        let mut params = vec![
            ("api_key", api_key.as_str()),
            ("query", title),
            ("include_adult", "false"),
        ];
        if let Some(year) = year {
            params.push(("year", year));
        }

        let response = self
            .http
            .get(format!("{}/search/movie", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let search: SearchResponse = response.json().await?;

        // First result is taken as canonical.
        let Some(hit) = search.results.into_iter().next() else {
            debug!("TMDB returned no results for '{}'", title);
            return Ok(None);
        };

        Ok(Some(MovieDetails {
            poster_url: hit.poster_path.as_deref().and_then(|p| self.poster_url(p)),
            // TMDB reports 0.0 for unrated titles.
            rating: hit.vote_average.filter(|v| *v > 0.0),
            overview: hit.overview.filter(|o| !o.is_empty()),
            canonical_title: hit.title,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> TmdbClient {
        TmdbClient::new(&MetadataSettings::default(), api_key.map(|k| k.to_string()))
    }

    #[test]
    fn test_configured_only_with_key() {
        assert!(!client(None).is_configured());
        assert!(client(Some("abc123")).is_configured());
    }

    #[test]
    fn test_poster_url_joins_image_base() {
        let url = client(Some("abc123")).poster_url("/poster.jpg").unwrap();
        assert_eq!(url, "https://image.tmdb.org/t/p/w342/poster.jpg");
    }

    #[test]
    fn test_search_hit_deserialization() {
        let search: SearchResponse = serde_json::from_str(
            r#"{"results":[{"title":"Arrival","poster_path":"/x.jpg","vote_average":7.9,"overview":"Aliens arrive."}]}"#,
        )
        .unwrap();
        assert_eq!(search.results[0].title, "Arrival");
        assert_eq!(search.results[0].vote_average, Some(7.9));
    }
}
