//! Query-time retrieval: embed the query, search the vector index.

pub mod context;

pub use context::{ContextAssembler, GroundingContext};

use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::{ScoredMovie, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default number of candidates to retrieve per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Turns query text into ranked movie candidates.
///
/// Stateless between calls: the query embedding is computed fresh every time
/// and never cached across turns.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    /// Create a retriever over an embedder and a vector index.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve the top-k candidates for the query text.
    ///
    /// Embedding-provider failures surface as
    /// [`CineMindError::Embedding`](crate::error::CineMindError::Embedding);
    /// an unbuilt index surfaces as
    /// [`CineMindError::IndexEmpty`](crate::error::CineMindError::IndexEmpty).
    #[instrument(skip(self), fields(query = %text, k = k))]
    pub async fn retrieve(&self, text: &str, k: usize) -> Result<Vec<ScoredMovie>> {
        let query_embedding = self.embedder.embed(text).await?;
        let results = self.index.query(&query_embedding, k)?;
        debug!("Retrieved {} candidates", results.len());
        Ok(results)
    }

    /// Retrieve with the default k.
    pub async fn retrieve_default(&self, text: &str) -> Result<Vec<ScoredMovie>> {
        self.retrieve(text, DEFAULT_TOP_K).await
    }
}
