//! Configuration management for CineMind.

mod prompts;
mod settings;

pub use prompts::{ProfilePrompts, Prompts, RecommendPrompts};
pub use settings::{
    ContextSettings, EmbeddingSettings, GenerationSettings, GeneralSettings, IndexSettings,
    MetadataSettings, ProfileSettings, PromptSettings, RetrievalSettings, Settings,
};
