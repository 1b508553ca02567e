//! Movie mention extraction.
//!
//! The generator is instructed to cite movies as `**Title (YYYY)**`. This
//! module scans free text for that literal shape with a small deterministic
//! scanner. Candidates without a valid 4-digit year are skipped whole; a
//! closing marker that fails validation is re-tried as the opener of the
//! next candidate, which resolves nested emphasis to the shortest match.

use std::collections::HashSet;

/// A movie citation extracted from generated text. Not authoritative —
/// enrichment resolves it against the metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieMention {
    /// Title as cited.
    pub title: String,
    /// Four-digit year as cited.
    pub year: String,
    /// Byte offset of the citation's first appearance.
    pub position: usize,
}

/// Extract all `**Title (YYYY)**` citations, in order of first appearance.
///
/// The first occurrence of a title wins; later duplicates (exact,
/// case-sensitive match) are dropped. An empty result is valid.
pub fn extract_mentions(text: &str) -> Vec<MovieMention> {
    let mut mentions = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find("**") {
        let open = pos + rel;
        let inner_start = open + 2;

        let Some(rel_close) = text[inner_start..].find("**") else {
            break;
        };
        let close = inner_start + rel_close;
        let inner = &text[inner_start..close];

        match split_title_year(inner) {
            Some((title, year)) => {
                if seen.insert(title.clone()) {
                    mentions.push(MovieMention {
                        title,
                        year,
                        position: open,
                    });
                }
                pos = close + 2;
            }
            None => {
                // Re-anchor at the failed span's end so its closing marker
                // can open the next candidate.
                pos = inner_start;
            }
        }
    }

    mentions
}

/// Split "Title (YYYY)" into its parts, or None if the shape doesn't hold.
fn split_title_year(inner: &str) -> Option<(String, String)> {
    let bytes = inner.as_bytes();
    let n = bytes.len();

    // Minimum shape: one title byte + " (YYYY)".
    if n < 8 || bytes[n - 1] != b')' {
        return None;
    }
    if !bytes[n - 5..n - 1].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if bytes[n - 6] != b'(' || bytes[n - 7] != b' ' {
        return None;
    }

    // All checked offsets are ASCII, so the slices land on char boundaries.
    let title = inner[..n - 7].trim_end();
    if title.is_empty() {
        return None;
    }
    let year = &inner[n - 5..n - 1];

    Some((title.to_string(), year.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        extract_mentions(text)
            .into_iter()
            .map(|m| (m.title, m.year))
            .collect()
    }

    #[test]
    fn test_extracts_mentions_in_order() {
        assert_eq!(
            pairs("Try **Inception (2010)** and **Arrival (2016)**."),
            vec![
                ("Inception".to_string(), "2010".to_string()),
                ("Arrival".to_string(), "2016".to_string())
            ]
        );
    }

    #[test]
    fn test_malformed_year_is_skipped_entirely() {
        assert!(pairs("**Foo (20X0)**").is_empty());
        assert!(pairs("**Foo (201)**").is_empty());
        assert!(pairs("**Foo (20100)**").is_empty());
        assert!(pairs("**Foo**").is_empty());
        assert!(pairs("**Foo ()**").is_empty());
    }

    #[test]
    fn test_malformed_candidate_does_not_eat_following_mention() {
        assert_eq!(
            pairs("**Foo (20X0)** and **Real (2010)**"),
            vec![("Real".to_string(), "2010".to_string())]
        );
    }

    #[test]
    fn test_nested_emphasis_resolves_to_shortest_match() {
        assert_eq!(
            pairs("**The **Matrix (1999)** reboot**"),
            vec![("Matrix".to_string(), "1999".to_string())]
        );
    }

    #[test]
    fn test_first_occurrence_wins_case_sensitive() {
        assert_eq!(
            pairs("**Alien (1979)**, then **Alien (1979)** again, and **ALIEN (1979)**"),
            vec![
                ("Alien".to_string(), "1979".to_string()),
                ("ALIEN".to_string(), "1979".to_string())
            ]
        );
    }

    #[test]
    fn test_positions_are_first_appearance_offsets() {
        let mentions = extract_mentions("Try **Inception (2010)** now");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].position, 4);
    }

    #[test]
    fn test_unclosed_marker_and_empty_text() {
        assert!(pairs("").is_empty());
        assert!(pairs("no citations here").is_empty());
        assert!(pairs("**Inception (2010)").is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "**A (2001)** mid **B (2002)** **C (2003)**";
        assert_eq!(pairs(text), pairs(text));
        assert_eq!(pairs(text).len(), 3);
    }

    #[test]
    fn test_year_must_follow_space_paren_shape() {
        // No space between title and year group.
        assert!(pairs("**Inception(2010)**").is_empty());
        // Trailing text after the year group.
        assert!(pairs("**Inception (2010) extra**").is_empty());
    }
}
