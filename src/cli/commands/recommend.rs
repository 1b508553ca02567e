//! Recommend command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::engine::RecommendEngine;
use anyhow::Result;

/// Run the recommend command.
pub async fn run_recommend(
    query: &str,
    model: Option<String>,
    top_k: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Recommend, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'cinemind doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.generation.model = model;
    }
    if let Some(top_k) = top_k {
        settings.retrieval.top_k = top_k;
    }

    let spinner = Output::spinner("Loading movie corpus...");
    let index = super::load_index(&settings).await?;
    spinner.finish_and_clear();

    let engine = RecommendEngine::new(&settings, index)?;

    let spinner = Output::spinner("CineMind is thinking...");
    let turn = engine.respond(query).await;
    spinner.finish_and_clear();

    println!("\n{}\n", turn.text);

    if turn.failed {
        Output::warning("The recommendation service was unavailable; this is a fallback reply.");
    }

    if !turn.movies.is_empty() {
        Output::header("Movies");
        for movie in &turn.movies {
            Output::movie_card(movie);
        }
    }

    Ok(())
}
