//! Grounding context assembly.
//!
//! Renders retrieved candidates into the bounded text block handed to the
//! generator. When the budget would be exceeded, whole candidates are dropped
//! from the bottom of the ranking; a candidate's text is never cut mid-sentence.

use crate::config::ContextSettings;
use crate::index::ScoredMovie;

/// The assembled, size-bounded grounding block.
#[derive(Debug, Clone)]
pub struct GroundingContext {
    text: String,
    included: usize,
}

impl GroundingContext {
    /// The rendered context text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of candidates that made it into the block.
    pub fn included(&self) -> usize {
        self.included
    }

    /// Whether no candidate fit the budget.
    pub fn is_empty(&self) -> bool {
        self.included == 0
    }
}

/// Renders candidates into a grounding block under a character budget.
pub struct ContextAssembler {
    max_chars: usize,
    summary_chars: usize,
}

impl ContextAssembler {
    /// Create an assembler from context settings.
    pub fn new(settings: &ContextSettings) -> Self {
        Self {
            max_chars: settings.max_chars,
            summary_chars: settings.summary_chars,
        }
    }

    /// Assemble a grounding block from ranked candidates.
    ///
    /// Deterministic for identical input. The result never exceeds the
    /// configured budget: candidates are included highest-ranked first until
    /// the next whole block would overflow.
    pub fn assemble(&self, candidates: &[ScoredMovie]) -> GroundingContext {
        let mut text = String::new();
        let mut included = 0;

        for (rank, candidate) in candidates.iter().enumerate() {
            let block = self.render_block(rank, candidate);
            let extra = if text.is_empty() {
                block.len()
            } else {
                block.len() + 2
            };

            if text.len() + extra > self.max_chars {
                break;
            }

            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(&block);
            included += 1;
        }

        GroundingContext { text, included }
    }

    /// Render one candidate as a compact labeled block.
    fn render_block(&self, rank: usize, candidate: &ScoredMovie) -> String {
        let movie = &candidate.movie;
        let mut block = format!("[{}] {}", rank + 1, movie.label());

        if !movie.genres.is_empty() {
            block.push_str(&format!("\nGenres: {}", movie.genres.join(", ")));
        }

        let summary = summary_snippet(&movie.overview, self.summary_chars);
        if !summary.is_empty() {
            block.push('\n');
            block.push_str(&summary);
        }

        block
    }
}

/// Shorten text to roughly `max` characters, cutting only at sentence ends.
///
/// If no sentence ends within the limit, the whole first sentence is kept
/// rather than splitting it.
fn summary_snippet(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.len() <= max {
        return text.to_string();
    }

    let mut last_within = None;
    let mut first_end = None;
    for (pos, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            let end = pos + ch.len_utf8();
            if first_end.is_none() {
                first_end = Some(end);
            }
            if end <= max {
                last_within = Some(end);
            } else {
                break;
            }
        }
    }

    match last_within.or(first_end) {
        Some(end) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MovieRecord;
    use std::sync::Arc;

    fn candidate(id: u64, title: &str, overview: &str) -> ScoredMovie {
        ScoredMovie {
            movie: Arc::new(MovieRecord {
                id,
                title: title.to_string(),
                year: Some(2014),
                overview: overview.to_string(),
                genres: vec!["Sci-Fi".to_string()],
                popularity: 0.0,
            }),
            score: 0.9,
        }
    }

    fn assembler(max_chars: usize) -> ContextAssembler {
        ContextAssembler::new(&ContextSettings {
            max_chars,
            summary_chars: 120,
        })
    }

    #[test]
    fn test_assemble_includes_all_when_budget_allows() {
        let candidates = vec![
            candidate(1, "Interstellar", "Explorers travel through a wormhole."),
            candidate(2, "Arrival", "A linguist decodes an alien language."),
        ];

        let context = assembler(500).assemble(&candidates);
        assert_eq!(context.included(), 2);
        assert!(context.text().contains("Interstellar (2014)"));
        assert!(context.text().contains("Arrival (2014)"));
        assert!(context.text().contains("Genres: Sci-Fi"));
    }

    #[test]
    fn test_budget_never_exceeded_drops_lowest_ranked() {
        let candidates: Vec<ScoredMovie> = (0..10)
            .map(|i| candidate(i, &format!("Movie{}", i), "Something happens. Then more."))
            .collect();

        for budget in [0, 10, 60, 150, 400, 10_000] {
            let context = assembler(budget).assemble(&candidates);
            assert!(
                context.text().len() <= budget,
                "budget {} exceeded: {}",
                budget,
                context.text().len()
            );
        }

        // A tight budget keeps the top-ranked candidate, not an arbitrary one.
        let tight = assembler(100).assemble(&candidates);
        assert!(tight.included() >= 1);
        assert!(tight.text().starts_with("[1] Movie0"));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let candidates = vec![
            candidate(1, "Interstellar", "Explorers travel through a wormhole."),
            candidate(2, "Arrival", "A linguist decodes an alien language."),
        ];

        let a = assembler(200).assemble(&candidates);
        let b = assembler(200).assemble(&candidates);
        assert_eq!(a.text(), b.text());
        assert_eq!(a.included(), b.included());
    }

    #[test]
    fn test_summary_cuts_at_sentence_boundary() {
        let text = "First sentence here. Second sentence is longer. Third one.";
        let snippet = summary_snippet(text, 30);
        assert_eq!(snippet, "First sentence here.");

        // A single long sentence is kept whole rather than split.
        let long = "This single sentence runs well past the limit without a break.";
        assert_eq!(summary_snippet(long, 20), long);
    }

    #[test]
    fn test_empty_candidates_yield_empty_context() {
        let context = assembler(500).assemble(&[]);
        assert!(context.is_empty());
        assert_eq!(context.text(), "");
    }
}
