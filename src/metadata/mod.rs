//! Display metadata enrichment.
//!
//! Each extracted mention gets one independent lookup against the metadata
//! service. Lookups run concurrently under a bounded fan-out; a failed or
//! empty lookup drops that mention from the output and never disturbs its
//! siblings. With no service configured, enrichment is skipped entirely.

mod tmdb;

pub use tmdb::TmdbClient;

use crate::error::Result;
use crate::mentions::MovieMention;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Metadata returned by the external service for one movie.
#[derive(Debug, Clone)]
pub struct MovieDetails {
    /// Canonical title according to the service.
    pub canonical_title: String,
    /// Poster image URL.
    pub poster_url: Option<String>,
    /// Average rating.
    pub rating: Option<f32>,
    /// Plot overview.
    pub overview: Option<String>,
}

/// Trait for metadata service backends.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Whether the service has credentials and can be called at all.
    fn is_configured(&self) -> bool;

    /// Best-effort free-text lookup; the first result is taken as canonical.
    /// Ok(None) means the service answered but found nothing.
    async fn lookup(&self, title: &str, year: Option<&str>) -> Result<Option<MovieDetails>>;
}

/// A mention joined with whatever metadata the lookup produced.
/// Each field is independently optional.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedMovie {
    #[serde(skip)]
    pub mention: MovieMention,
    pub poster_url: Option<String>,
    pub rating: Option<f32>,
    pub overview: Option<String>,
}

impl EnrichedMovie {
    /// Title as cited in the generated text.
    pub fn title(&self) -> &str {
        &self.mention.title
    }

    /// Year as cited in the generated text.
    pub fn year(&self) -> &str {
        &self.mention.year
    }
}

/// Fans mention lookups out against the metadata service.
pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
    max_concurrent: usize,
}

impl Enricher {
    /// Create an enricher with a concurrency ceiling for lookups.
    pub fn new(provider: Arc<dyn MetadataProvider>, max_concurrent: usize) -> Self {
        Self {
            provider,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Look up every mention concurrently, keeping the successes.
    ///
    /// Failures and not-found results are dropped per item. Output is
    /// duplicate-free and ordered by the mention's position in the text.
    #[instrument(skip(self, mentions), fields(count = mentions.len()))]
    pub async fn enrich(&self, mentions: &[MovieMention]) -> Vec<EnrichedMovie> {
        if mentions.is_empty() {
            return Vec::new();
        }
        if !self.provider.is_configured() {
            debug!("Metadata service not configured, skipping enrichment");
            return Vec::new();
        }

        let limit = self.max_concurrent.min(mentions.len());

        let mut stream = stream::iter(mentions.iter().cloned())
            .map(|mention| {
                let provider = self.provider.clone();
                async move {
                    match provider.lookup(&mention.title, Some(&mention.year)).await {
                        Ok(Some(details)) => Some(EnrichedMovie {
                            mention,
                            poster_url: details.poster_url,
                            rating: details.rating,
                            overview: details.overview,
                        }),
                        Ok(None) => {
                            debug!("No metadata match for '{}'", mention.title);
                            None
                        }
                        Err(e) => {
                            debug!("Metadata lookup for '{}' failed: {}", mention.title, e);
                            None
                        }
                    }
                }
            })
            .buffer_unordered(limit);

        let mut enriched = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        while let Some(result) = stream.next().await {
            if let Some(movie) = result {
                if seen.insert(movie.mention.title.clone()) {
                    enriched.push(movie);
                }
            }
        }

        enriched.sort_by_key(|m| m.mention.position);
        enriched
    }
}
