//! CLI output formatting utilities.

use crate::metadata::EnrichedMovie;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a retrieval result.
    pub fn search_result(label: &str, score: f32, genres: &str, summary: &str) {
        println!(
            "\n{} {} (score: {:.3})",
            style(">>").green(),
            style(label).bold(),
            score
        );
        if !genres.is_empty() {
            println!("   {}", style(genres).dim());
        }
        if !summary.is_empty() {
            println!("   {}", content_preview(summary, 200));
        }
    }

    /// Print an enriched movie card.
    pub fn movie_card(movie: &EnrichedMovie) {
        let rating = movie
            .rating
            .map(|r| format!(" [{:.1}/10]", r))
            .unwrap_or_default();
        println!(
            "  {} {} ({}){}",
            style("*").cyan(),
            style(movie.title()).bold(),
            movie.year(),
            rating
        );
        if let Some(overview) = &movie.overview {
            println!("    {}", content_preview(overview, 160));
        }
        if let Some(poster) = &movie.poster_url {
            println!("    {}", style(poster).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.len() <= max_len {
        content
    } else {
        let cut = content
            .char_indices()
            .take_while(|(i, _)| *i <= max_len)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}...", &content[..cut])
    }
}
