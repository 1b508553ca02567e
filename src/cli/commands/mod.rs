//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod recommend;
mod search;
mod serve;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use recommend::run_recommend;
pub use search::run_search;
pub use serve::run_serve;

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::Corpus;
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::index::VectorIndex;
use std::sync::Arc;

/// Load the corpus artifact and build the vector index.
///
/// Records the build job shipped without vectors get embedded here, so a
/// plain-JSON corpus still serves. An empty corpus is fatal: the service
/// must not start without a successful build.
pub(crate) async fn load_index(settings: &Settings) -> Result<Arc<VectorIndex>> {
    let path = settings.artifact_path();
    let mut corpus = Corpus::load(&path)?;

    if corpus.missing_embeddings() > 0 {
        let spinner = Output::spinner(&format!(
            "Embedding {} movies without vectors...",
            corpus.missing_embeddings()
        ));
        let embedder = OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        );
        corpus.embed_missing(&embedder).await?;
        spinner.finish_and_clear();
    }

    let index = VectorIndex::new();
    index.build(corpus.into_vectors()?)?;
    Ok(Arc::new(index))
}
