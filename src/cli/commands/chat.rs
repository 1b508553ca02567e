//! Interactive recommendation chat.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::engine::RecommendEngine;
use crate::error::Result;
use crate::session::Session;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, mut settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Recommend, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'cinemind doctor' for detailed diagnostics.");
        return Err(e);
    }

    if let Some(model) = model {
        settings.generation.model = model;
    }

    let spinner = Output::spinner("Loading movie corpus...");
    let index = super::load_index(&settings).await?;
    spinner.finish_and_clear();

    let engine = RecommendEngine::new(&settings, index)?;
    let mut session = Session::new();

    println!("\n{}", style("CineMind Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask for movie recommendations, or 'exit' to quit. Use 'clear' to start over.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session = Session::new();
            Output::info("Session cleared.");
            continue;
        }

        let spinner = Output::spinner("CineMind is thinking...");
        let result = engine.run_turn(&mut session, input).await;
        spinner.finish_and_clear();

        match result {
            Ok(turn) => {
                println!("\n{} {}\n", style("CineMind:").cyan().bold(), turn.text);
                for movie in &turn.movies {
                    Output::movie_card(movie);
                }
                if !turn.movies.is_empty() {
                    println!();
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
