//! In-memory vector index over movie embeddings.
//!
//! The index is built once from the corpus artifact and queried read-only at
//! runtime. Rebuilds install a fresh immutable snapshot behind the same
//! handle; readers that already pinned a snapshot keep querying it and never
//! observe a partially built structure.

use crate::corpus::MovieRecord;
use crate::error::{CineMindError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::info;

/// A retrieved movie with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredMovie {
    /// The matched movie.
    pub movie: Arc<MovieRecord>,
    /// Cosine similarity score (higher is better).
    pub score: f32,
}

/// One immutable generation of the index.
#[derive(Debug)]
pub struct IndexSnapshot {
    version: u64,
    dimensions: usize,
    movies: Vec<Arc<MovieRecord>>,
    vectors: Vec<Vec<f32>>,
}

impl IndexSnapshot {
    /// Version id of this snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of indexed movies.
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Whether the snapshot holds no movies. Build rejects empty corpora,
    /// so this is false for any installed snapshot.
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Embedding dimensions of this snapshot.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Return the k nearest movies to the query vector by cosine similarity.
    ///
    /// k is clamped to [1, corpus size]. Results are ordered by descending
    /// score; ties break by ascending movie id.
    pub fn query(&self, query_vector: &[f32], k: usize) -> Vec<ScoredMovie> {
        let k = k.clamp(1, self.movies.len());

        let mut results: Vec<ScoredMovie> = self
            .movies
            .iter()
            .zip(self.vectors.iter())
            .map(|(movie, vector)| ScoredMovie {
                movie: movie.clone(),
                score: cosine_similarity(query_vector, vector),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.movie.id.cmp(&b.movie.id))
        });
        results.truncate(k);

        results
    }
}

/// Versioned handle over the current index snapshot.
///
/// Queries pin a snapshot by cloning its `Arc` under a short read lock and
/// then search lock-free, so an in-progress rebuild never blocks them.
pub struct VectorIndex {
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
    next_version: AtomicU64,
}

impl VectorIndex {
    /// Create an index with no snapshot installed yet.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            next_version: AtomicU64::new(1),
        }
    }

    /// Build a new snapshot from (record, vector) pairs and install it.
    ///
    /// Returns the new snapshot's version id. The previous snapshot, if any,
    /// stays valid for readers that already pinned it.
    pub fn build(&self, corpus: Vec<(MovieRecord, Vec<f32>)>) -> Result<u64> {
        if corpus.is_empty() {
            return Err(CineMindError::Index(
                "cannot build an index from an empty corpus".to_string(),
            ));
        }

        let dimensions = corpus[0].1.len();
        if dimensions == 0 {
            return Err(CineMindError::Index(
                "corpus vectors have zero dimensions".to_string(),
            ));
        }
        for (movie, vector) in &corpus {
            if vector.len() != dimensions {
                return Err(CineMindError::Index(format!(
                    "movie '{}' has a {}-dim vector, expected {}",
                    movie.title,
                    vector.len(),
                    dimensions
                )));
            }
        }

        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let (movies, vectors): (Vec<_>, Vec<_>) = corpus
            .into_iter()
            .map(|(movie, vector)| (Arc::new(movie), vector))
            .unzip();

        let snapshot = Arc::new(IndexSnapshot {
            version,
            dimensions,
            movies,
            vectors,
        });

        info!(
            "Installed index version {} ({} movies, {} dims)",
            version,
            snapshot.len(),
            dimensions
        );
        *self.snapshot.write().unwrap() = Some(snapshot);
        Ok(version)
    }

    /// Pin the current snapshot for querying.
    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        self.snapshot
            .read()
            .unwrap()
            .clone()
            .ok_or(CineMindError::IndexEmpty)
    }

    /// Query the current snapshot for the k nearest movies.
    pub fn query(&self, query_vector: &[f32], k: usize) -> Result<Vec<ScoredMovie>> {
        Ok(self.snapshot()?.query(query_vector, k))
    }

    /// Whether a snapshot has been installed.
    pub fn is_built(&self) -> bool {
        self.snapshot.read().unwrap().is_some()
    }

    /// Number of movies in the current snapshot, or 0 if none.
    pub fn len(&self) -> usize {
        self.snapshot
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Whether no snapshot is installed or the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Version of the current snapshot, if one is installed.
    pub fn version(&self) -> Option<u64> {
        self.snapshot.read().unwrap().as_ref().map(|s| s.version())
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
