//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::Corpus;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("CineMind Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check API keys
    println!("{}", style("API Configuration").bold());
    let api_check = check_openai_api_key();
    api_check.print();
    checks.push(api_check);
    let tmdb_check = check_tmdb_api_key(settings);
    tmdb_check.print();
    checks.push(tmdb_check);

    println!();

    // Check the corpus artifact
    println!("{}", style("Corpus").bold());
    let artifact_check = check_artifact(settings);
    artifact_check.print();
    checks.push(artifact_check);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using CineMind.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! CineMind is ready to use.");
    }

    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check if the TMDB API key is configured. Optional: enrichment is skipped
/// without it, so absence is a warning rather than an error.
fn check_tmdb_api_key(settings: &Settings) -> CheckResult {
    match settings.metadata_api_key() {
        Some(_) => CheckResult::ok("TMDB_API_KEY", "configured"),
        None => CheckResult::warning(
            "TMDB_API_KEY",
            "not set (movie cards disabled)",
            "Set with: export TMDB_API_KEY='...' or [metadata].api_key in config",
        ),
    }
}

/// Check the corpus artifact: present and parseable.
fn check_artifact(settings: &Settings) -> CheckResult {
    let path = settings.artifact_path();
    if !path.exists() {
        return CheckResult::error(
            "Corpus artifact",
            &format!("{} (not found)", path.display()),
            "Point [index].artifact_path at the build job's output",
        );
    }

    match Corpus::load(&path) {
        Ok(corpus) if corpus.is_empty() => CheckResult::error(
            "Corpus artifact",
            &format!("{} (empty)", path.display()),
            "The artifact holds no movies; re-run the build job",
        ),
        Ok(corpus) => {
            let missing = corpus.missing_embeddings();
            if missing > 0 {
                CheckResult::warning(
                    "Corpus artifact",
                    &format!(
                        "{} ({} movies, {} without embeddings)",
                        path.display(),
                        corpus.len(),
                        missing
                    ),
                    "Missing vectors are embedded at startup, which costs API calls",
                )
            } else {
                CheckResult::ok(
                    "Corpus artifact",
                    &format!("{} ({} movies)", path.display(), corpus.len()),
                )
            }
        }
        Err(e) => CheckResult::error(
            "Corpus artifact",
            &format!("{} (unreadable)", path.display()),
            &format!("{}", e),
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: cinemind config edit",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let mut settings = Settings::default();
        settings.index.artifact_path = "/nonexistent/corpus.jsonl".to_string();
        let result = check_artifact(&settings);
        assert_eq!(result.status, CheckStatus::Error);
    }
}
