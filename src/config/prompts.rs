//! Prompt templates for CineMind.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub recommend: RecommendPrompts,
    pub profile: ProfilePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for recommendation generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RecommendPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are CineMind, an AI movie recommendation assistant.
You receive a user's request and a list of candidate movies retrieved from a movie knowledge base.

Your job:
- Select the 3-5 best recommendations that fit the user's taste, drawing only on the candidates provided
- Explain why each movie suits the user, referencing tone, genre, era, or theme
- Write naturally, like a friendly movie expert, about 1-2 sentences per movie
- Every time you name a recommended movie, cite it in exactly this form: **Title (Year)**
  For example: **Interstellar (2014)**. Use the title and year given in the candidate list.
- If none of the candidates fit, say so honestly rather than inventing movies"#
                .to_string(),

            user: r#"User request: {{query}}

Candidate movies from the knowledge base:

{{context}}

Write your recommendations based on the candidates above."#
                .to_string(),
        }
    }
}

/// Prompts for taste profile extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePrompts {
    pub system: String,
    pub user: String,
}

impl Default for ProfilePrompts {
    fn default() -> Self {
        Self {
            system: r#"You analyze movie requests and extract the user's preferences as JSON.

Return a JSON object with keys:
- "genres": list of genres or themes
- "tone": list of tone or mood descriptors
- "decade": list of decade or period clues
- "people": list of directors or actors mentioned
- "other_preferences": any extra info (e.g., story elements, settings, pacing)

Every key must be present. Use empty lists for anything not mentioned.
Return only the JSON object, no commentary."#
                .to_string(),

            user: "User query: {{query}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load recommendation prompts if file exists
            let recommend_path = custom_path.join("recommend.toml");
            if recommend_path.exists() {
                let content = std::fs::read_to_string(&recommend_path)?;
                prompts.recommend = toml::from_str(&content)?;
            }

            // Load profile prompts if file exists
            let profile_path = custom_path.join("profile.toml");
            if profile_path.exists() {
                let content = std::fs::read_to_string(&profile_path)?;
                prompts.profile = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.recommend.system.is_empty());
        assert!(!prompts.profile.system.is_empty());
        // The citation contract the response parser relies on.
        assert!(prompts.recommend.system.contains("**Title (Year)**"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }
}
