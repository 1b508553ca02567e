//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::retrieval::Retriever;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'cinemind doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let spinner = Output::spinner("Loading movie corpus...");
    let index = super::load_index(&settings).await?;
    spinner.finish_and_clear();

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));
    let retriever = Retriever::new(embedder, index);

    let spinner = Output::spinner("Searching...");
    let results = retriever.retrieve(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(candidates) => {
            if candidates.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", candidates.len()));

                for candidate in &candidates {
                    Output::search_result(
                        &candidate.movie.label(),
                        candidate.score,
                        &candidate.movie.genres.join(", "),
                        &candidate.movie.overview,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
