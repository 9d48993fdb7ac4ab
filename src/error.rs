//! Error types for Coursebot.

use thiserror::Error;

/// Library-level error type for Coursebot operations.
#[derive(Error, Debug)]
pub enum CoursebotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("LLM call failed: {0}")]
    Llm(String),

    #[error("Could not parse function arguments: {0}")]
    ArgumentParse(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Failed to insert document {id} after {attempts} attempts: {source}")]
    InsertRetryExhausted {
        id: String,
        attempts: u32,
        #[source]
        source: Box<CoursebotError>,
    },

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Coursebot operations.
pub type Result<T> = std::result::Result<T, CoursebotError>;
