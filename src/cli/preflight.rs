//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials and input files are available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{CoursebotError, Result};
use crate::openai::api_key;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chatting and asking require the API key.
    Ask,
    /// Ingestion requires the API key and a readable schedule export.
    Ingest,
    /// Searching embeds the term, so it requires the API key.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Search => {
            api_key(&settings.llm.api_key_env)?;
        }
        Operation::Ingest => {
            api_key(&settings.llm.api_key_env)?;
            check_catalog(settings)?;
        }
    }
    Ok(())
}

fn check_catalog(settings: &Settings) -> Result<()> {
    let path = settings.catalog_path();
    if path.is_file() {
        Ok(())
    } else {
        Err(CoursebotError::Ingestion(format!(
            "Schedule export not found at {}. Set catalog.csv_path in {}",
            path.display(),
            Settings::default_config_path().display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "COURSEBOT_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        if std::env::var(crate::openai::FALLBACK_KEY_ENV).is_ok() {
            return;
        }
        let result = check(Operation::Ask, &settings);
        assert!(matches!(result, Err(CoursebotError::Config(_))));
    }

    #[test]
    fn test_missing_catalog_is_ingestion_error() {
        let mut settings = Settings::default();
        settings.catalog.csv_path = "/nonexistent/schedule.csv".to_string();
        assert!(matches!(
            check_catalog(&settings),
            Err(CoursebotError::Ingestion(_))
        ));

        let file = tempfile::NamedTempFile::new().unwrap();
        settings.catalog.csv_path = file.path().to_string_lossy().to_string();
        assert!(check_catalog(&settings).is_ok());
    }
}
