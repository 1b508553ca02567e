//! Movie corpus loading.
//!
//! The corpus artifact is produced offline (one JSON object per line) and
//! consumed here at service start. Records usually carry precomputed
//! embeddings; records without one can be completed via the embedding
//! provider before the index is built.

use crate::embedding::Embedder;
use crate::error::{CineMindError, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

/// A single movie in the corpus. Immutable once the index is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Stable corpus-wide ID, used for deterministic tie-breaking.
    pub id: u64,
    /// Movie title.
    pub title: String,
    /// Release year, when known.
    #[serde(default)]
    pub year: Option<u16>,
    /// Plot summary.
    #[serde(default)]
    pub overview: String,
    /// Genre tags.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Popularity score from the source dataset.
    #[serde(default)]
    pub popularity: f32,
}

impl MovieRecord {
    /// Display label, e.g. "Interstellar (2014)".
    pub fn label(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    /// The text that is embedded for this record.
    pub fn embedding_text(&self) -> String {
        format!(
            "Title: {}\nGenres: {}\nContent: {}",
            self.label(),
            self.genres.join(", "),
            self.overview
        )
    }
}

/// One line of the corpus artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    #[serde(flatten)]
    pub movie: MovieRecord,
    /// Precomputed embedding vector, if the build job emitted one.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// An in-memory corpus, ready to be turned into a vector index.
#[derive(Debug, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// Load a corpus from a JSONL artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            CineMindError::Corpus(format!("cannot open {}: {}", path.display(), e))
        })?;

        let mut entries = Vec::new();
        for (line_no, line) in std::io::BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: CorpusEntry = serde_json::from_str(&line).map_err(|e| {
                CineMindError::Corpus(format!(
                    "{}:{}: invalid record: {}",
                    path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        info!("Loaded {} movies from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Build a corpus from already-parsed entries.
    pub fn from_entries(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Number of movies in the corpus.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries without a precomputed embedding.
    pub fn missing_embeddings(&self) -> usize {
        self.entries.iter().filter(|e| e.embedding.is_none()).count()
    }

    /// Fill in embeddings for entries that lack one.
    pub async fn embed_missing(&mut self, embedder: &dyn Embedder) -> Result<usize> {
        let missing: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        if missing.is_empty() {
            return Ok(0);
        }

        debug!("Embedding {} records without vectors", missing.len());
        let texts: Vec<String> = missing
            .iter()
            .map(|&i| self.entries[i].movie.embedding_text())
            .collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        for (&i, embedding) in missing.iter().zip(embeddings) {
            self.entries[i].embedding = Some(embedding);
        }
        Ok(missing.len())
    }

    /// Consume the corpus into (record, vector) pairs for index building.
    ///
    /// Fails if any entry still lacks an embedding.
    pub fn into_vectors(self) -> Result<Vec<(MovieRecord, Vec<f32>)>> {
        self.entries
            .into_iter()
            .map(|entry| match entry.embedding {
                Some(vector) => Ok((entry.movie, vector)),
                None => Err(CineMindError::Corpus(format!(
                    "movie '{}' has no embedding; run the build job or embed at load time",
                    entry.movie.title
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_line(id: u64, title: &str, year: u16) -> String {
        format!(
            r#"{{"id":{},"title":"{}","year":{},"overview":"A film.","genres":["Drama"],"popularity":1.0,"embedding":[1.0,0.0]}}"#,
            id, title, year
        )
    }

    #[test]
    fn test_load_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_line(1, "Interstellar", 2014)).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", sample_line(2, "Arrival", 2016)).unwrap();

        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.missing_embeddings(), 0);

        let vectors = corpus.into_vectors().unwrap();
        assert_eq!(vectors[0].0.label(), "Interstellar (2014)");
        assert_eq!(vectors[1].1, vec![1.0, 0.0]);
    }

    #[test]
    fn test_load_rejects_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(Corpus::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_embedding_is_an_error() {
        let entry: CorpusEntry =
            serde_json::from_str(r#"{"id":1,"title":"Solaris","year":1972}"#).unwrap();
        let corpus = Corpus::from_entries(vec![entry]);
        assert_eq!(corpus.missing_embeddings(), 1);
        assert!(corpus.into_vectors().is_err());
    }

    #[test]
    fn test_label_without_year() {
        let record: MovieRecord = serde_json::from_str(r#"{"id":7,"title":"Stalker"}"#).unwrap();
        assert_eq!(record.label(), "Stalker");
    }
}
