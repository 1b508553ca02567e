//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{CineMindError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Recommendations require the API key and a corpus artifact.
    Recommend,
    /// Search requires the API key (query embedding) and a corpus artifact.
    Search,
    /// Serving requires the same as recommendations.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Recommend | Operation::Search | Operation::Serve => {
            check_api_key()?;
            check_artifact(settings)?;
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(CineMindError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(CineMindError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that the corpus artifact exists.
fn check_artifact(settings: &Settings) -> Result<()> {
    let path = settings.artifact_path();
    if path.exists() {
        Ok(())
    } else {
        Err(CineMindError::Config(format!(
            "Corpus artifact not found at {}. Point [index].artifact_path at the build job's output.",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_fails_preflight() {
        let mut settings = Settings::default();
        settings.index.artifact_path = "/nonexistent/corpus.jsonl".to_string();
        assert!(check_artifact(&settings).is_err());
    }

    #[test]
    fn test_existing_artifact_passes() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut settings = Settings::default();
        settings.index.artifact_path = file.path().display().to_string();
        assert!(check_artifact(&settings).is_ok());
    }
}
