//! Configuration settings for Coursebot.

use crate::error::{CoursebotError, Result};
use crate::identity::{builtin_identities, AliasRegistry, Identity};
use crate::retry::{Backoff, RetryPolicy};
use crate::search::{CollectionNames, DEFAULT_COURSE_COLLECTION, DEFAULT_INSTRUCTOR_COLLECTION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub catalog: CatalogSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub search: SearchSettings,
    pub assistant: AssistantSettings,
    pub ingest: IngestSettings,
    pub aliases: AliasSettings,
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
            data_dir: "~/.coursebot".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Where the schedule export lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Tab-delimited schedule export.
    pub csv_path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            csv_path: "Fall 2024 Class Schedule 08082024.csv".to_string(),
        }
    }
}

/// Chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model used for extraction and synthesis.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_PROJECT_KEY".to_string(),
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreProvider {
    /// Persistent SQLite file (default).
    #[default]
    Sqlite,
    /// Process-local, lost on exit.
    Memory,
}

impl std::str::FromStr for VectorStoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(VectorStoreProvider::Sqlite),
            "memory" => Ok(VectorStoreProvider::Memory),
            _ => Err(format!("Unknown vector store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for VectorStoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorStoreProvider::Sqlite => write!(f, "sqlite"),
            VectorStoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    pub provider: VectorStoreProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
    /// Collection holding course documents.
    pub course_collection: String,
    /// Collection holding instructor names.
    pub instructor_collection: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Sqlite,
            sqlite_path: "~/.coursebot/vectors.db".to_string(),
            course_collection: DEFAULT_COURSE_COLLECTION.to_string(),
            instructor_collection: DEFAULT_INSTRUCTOR_COLLECTION.to_string(),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum documents returned per search term.
    pub result_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { result_limit: 5 }
    }
}

/// How a question is turned into a search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStrategy {
    /// Ask the model for structured arguments, then plan a search (default).
    #[default]
    Structured,
    /// Search with the raw question and hand the hits to the model as context.
    Keyword,
}

impl std::str::FromStr for RoutingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structured" => Ok(RoutingStrategy::Structured),
            "keyword" => Ok(RoutingStrategy::Keyword),
            _ => Err(format!("Unknown routing strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingStrategy::Structured => write!(f, "structured"),
            RoutingStrategy::Keyword => write!(f, "keyword"),
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub routing: RoutingStrategy,
    /// Replace aliases with canonical names in questions before routing.
    pub alias_substitution: bool,
    /// Transcript cap after each turn. Zero keeps everything.
    pub max_transcript_messages: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            routing: RoutingStrategy::Structured,
            alias_substitution: false,
            max_transcript_messages: 40,
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Attempts per document, including the first.
    pub max_attempts: u32,
    /// Base delay between attempts.
    pub backoff_ms: u64,
    pub backoff: Backoff,
    /// Writes in flight at once.
    pub concurrency: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 1000,
            backoff: Backoff::Linear,
            concurrency: 4,
        }
    }
}

impl IngestSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.backoff_ms),
            self.backoff,
        )
    }
}

/// Instructor alias table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasSettings {
    /// Inline identities.
    pub identities: Vec<Identity>,
    /// TOML file of `[[identity]]` entries. Replaces `identities` when set.
    pub file: Option<String>,
}

impl Default for AliasSettings {
    fn default() -> Self {
        Self {
            identities: builtin_identities(),
            file: None,
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
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
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

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoursebotError::Config(e.to_string()))
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursebot")
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

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded schedule export path.
    pub fn catalog_path(&self) -> PathBuf {
        Self::expand_path(&self.catalog.csv_path)
    }

    pub fn collection_names(&self) -> CollectionNames {
        CollectionNames::new(
            self.vector_store.course_collection.clone(),
            self.vector_store.instructor_collection.clone(),
        )
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Build the alias registry from the file, if configured, else the inline table.
    pub fn alias_registry(&self) -> Result<AliasRegistry> {
        match &self.aliases.file {
            Some(file) => AliasRegistry::from_file(&Self::expand_path(file)),
            None => AliasRegistry::new(self.aliases.identities.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.llm.api_key_env, "OPENAI_PROJECT_KEY");
        assert_eq!(settings.search.result_limit, 5);
        assert_eq!(settings.assistant.routing, RoutingStrategy::Structured);
        assert!(!settings.assistant.alias_substitution);
        assert_eq!(settings.vector_store.course_collection, "courses-collection");
        assert_eq!(settings.ingest.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.alias_registry().unwrap().list_identities().len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [assistant]
            routing = "keyword"

            [ingest]
            backoff = "exponential"
            max_attempts = 5

            [[aliases.identities]]
            canonical_name = "Ada Lovelace"
            aliases = ["Ada", "Countess of Lovelace"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.assistant.routing, RoutingStrategy::Keyword);
        assert_eq!(settings.assistant.max_transcript_messages, 40);
        assert_eq!(settings.ingest.backoff, Backoff::Exponential);
        assert_eq!(settings.ingest.max_attempts, 5);
        assert_eq!(settings.ingest.backoff_ms, 1000);
        assert_eq!(settings.llm.model, "gpt-4o-mini");

        let registry = settings.alias_registry().unwrap();
        assert_eq!(registry.list_identities().len(), 1);
        assert_eq!(registry.list_identities()[0].canonical_name, "Ada Lovelace");
    }

    #[test]
    fn test_rendered_toml_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.vector_store.provider = VectorStoreProvider::Memory;
        settings.search.result_limit = 10;
        std::fs::write(&path, settings.to_toml().unwrap()).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.vector_store.provider, VectorStoreProvider::Memory);
        assert_eq!(loaded.search.result_limit, 10);
    }

    #[test]
    fn test_general_log_level() {
        assert_eq!(Settings::default().general.log_level, "warn");

        let settings: Settings = toml::from_str("[general]\nlog_level = \"debug\"\n").unwrap();
        assert_eq!(settings.general.log_level, "debug");
        assert_eq!(settings.general.data_dir, "~/.coursebot");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = PathBuf::from("/nonexistent/coursebot/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.catalog.csv_path, "Fall 2024 Class Schedule 08082024.csv");
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("KEYWORD".parse::<RoutingStrategy>().unwrap(), RoutingStrategy::Keyword);
        assert!("fuzzy".parse::<RoutingStrategy>().is_err());
        assert_eq!("memory".parse::<VectorStoreProvider>().unwrap(), VectorStoreProvider::Memory);
    }
}
