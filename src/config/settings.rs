//! Configuration settings for CineMind.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub retrieval: RetrievalSettings,
    pub context: ContextSettings,
    pub profile: ProfileSettings,
    pub generation: GenerationSettings,
    pub metadata: MetadataSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.cinemind".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-large".to_string(),
            dimensions: 3072,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Path to the corpus artifact (JSONL, one movie per line).
    pub artifact_path: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            artifact_path: "~/.cinemind/corpus.jsonl".to_string(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of candidate movies to retrieve per query.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Grounding context assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Maximum size of the assembled grounding block, in characters.
    pub max_chars: usize,
    /// Maximum length of a single candidate's summary, in characters.
    pub summary_chars: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_chars: 2400,
            summary_chars: 300,
        }
    }
}

/// Taste profiling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Enable the profiling pass before retrieval.
    pub enabled: bool,
    /// LLM model for preference extraction.
    pub model: String,
    /// Sampling temperature for preference extraction.
    pub temperature: f32,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4-turbo".to_string(),
            temperature: 0.3,
        }
    }
}

/// Response generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// LLM model for recommendation generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-attempt deadline, in seconds.
    pub timeout_seconds: u64,
    /// Number of retries after the first failed attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".to_string(),
            temperature: 0.7,
            timeout_seconds: 30,
            max_retries: 2,
            backoff_ms: 500,
        }
    }
}

/// Movie metadata service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// TMDB API key. Falls back to the TMDB_API_KEY environment variable.
    /// When neither is set, enrichment is skipped entirely.
    pub api_key: Option<String>,
    /// TMDB API base URL.
    pub base_url: String,
    /// Base URL for poster images.
    pub image_base_url: String,
    /// Maximum concurrent metadata lookups per response.
    pub max_concurrent: usize,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w342".to_string(),
            max_concurrent: 8,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CineMindError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cinemind")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded corpus artifact path.
    pub fn artifact_path(&self) -> PathBuf {
        Self::expand_path(&self.index.artifact_path)
    }

    /// Resolve the TMDB API key from config or environment.
    pub fn metadata_api_key(&self) -> Option<String> {
        self.metadata
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("TMDB_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}
