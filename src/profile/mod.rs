//! Taste profile extraction.
//!
//! An optional LLM pass that turns a free-text request into structured
//! preferences, then renders those into a focused retrieval query. Profiling
//! failures are not user-facing: the pipeline falls back to retrieving on
//! the raw query text.

use crate::config::Prompts;
use crate::error::{CineMindError, Result};
use crate::generation::Generator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Structured movie preferences extracted from a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TasteProfile {
    pub genres: Vec<String>,
    pub tone: Vec<String>,
    pub decade: Vec<String>,
    pub people: Vec<String>,
    pub other_preferences: Vec<String>,
}

impl TasteProfile {
    /// Whether nothing at all was extracted.
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
            && self.tone.is_empty()
            && self.decade.is_empty()
            && self.people.is_empty()
            && self.other_preferences.is_empty()
    }

    /// Render the profile into a natural retrieval query.
    pub fn search_prompt(&self) -> String {
        let mut parts = Vec::new();
        if !self.genres.is_empty() {
            parts.push(format!("genres: {}", self.genres.join(", ")));
        }
        if !self.tone.is_empty() {
            parts.push(format!("tone: {}", self.tone.join(", ")));
        }
        if !self.decade.is_empty() {
            parts.push(format!("from the {}", self.decade.join(", ")));
        }
        if !self.people.is_empty() {
            parts.push(format!("involving {}", self.people.join(", ")));
        }
        if !self.other_preferences.is_empty() {
            parts.push(format!("themes: {}", self.other_preferences.join(", ")));
        }

        if parts.is_empty() {
            "Recommend movies that match the user's tastes".to_string()
        } else {
            format!("Recommend movies that match {}", parts.join(", "))
        }
    }
}

/// Extracts taste profiles via the generation service.
pub struct Profiler {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl Profiler {
    /// Create a profiler from a generator backend and prompt set.
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts) -> Self {
        Self { generator, prompts }
    }

    /// Extract a taste profile from the raw query text.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn profile(&self, query: &str) -> Result<TasteProfile> {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());

        let system = self
            .prompts
            .render_with_custom(&self.prompts.profile.system, &vars);
        let user = self
            .prompts
            .render_with_custom(&self.prompts.profile.user, &vars);

        let reply = self.generator.complete(&system, &user).await?;
        let cleaned = strip_code_fences(&reply);

        let profile: TasteProfile = serde_json::from_str(&cleaned)
            .map_err(|e| CineMindError::Profile(format!("invalid profile JSON: {}", e)))?;

        debug!("Extracted profile: {:?}", profile);
        Ok(profile)
    }
}

/// Strip markdown code fences that some models wrap JSON replies in.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedGenerator(String);

    #[async_trait]
    impl Generator for CannedGenerator {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.clone())
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    const SAMPLE_JSON: &str = r#"{
        "genres": ["romance", "comedy"],
        "tone": ["light-hearted"],
        "decade": ["2000s"],
        "people": [],
        "other_preferences": ["feel-good"]
    }"#;

    #[test]
    fn test_search_prompt_rendering() {
        let profile: TasteProfile = serde_json::from_str(SAMPLE_JSON).unwrap();
        assert_eq!(
            profile.search_prompt(),
            "Recommend movies that match genres: romance, comedy, tone: light-hearted, \
             from the 2000s, themes: feel-good"
        );
    }

    #[test]
    fn test_empty_profile_falls_back_to_generic_prompt() {
        let profile = TasteProfile::default();
        assert!(profile.is_empty());
        assert_eq!(
            profile.search_prompt(),
            "Recommend movies that match the user's tastes"
        );
    }

    #[tokio::test]
    async fn test_fenced_reply_decodes_like_bare_json() {
        let bare = Profiler::new(
            Arc::new(CannedGenerator(SAMPLE_JSON.to_string())),
            Prompts::default(),
        );
        let fenced = Profiler::new(
            Arc::new(CannedGenerator(format!("```json\n{}\n```", SAMPLE_JSON))),
            Prompts::default(),
        );

        let a = bare.profile("anything").await.unwrap();
        let b = fenced.profile("anything").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.genres, vec!["romance", "comedy"]);
    }

    #[tokio::test]
    async fn test_non_json_reply_is_an_error() {
        let profiler = Profiler::new(
            Arc::new(CannedGenerator("I love movies!".to_string())),
            Prompts::default(),
        );
        assert!(profiler.profile("anything").await.is_err());
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let profile: TasteProfile = serde_json::from_str(r#"{"genres": ["drama"]}"#).unwrap();
        assert_eq!(profile.genres, vec!["drama"]);
        assert!(profile.people.is_empty());
    }
}
