//! Configuration module for Coursebot.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts};
pub use settings::{
    AliasSettings, AssistantSettings, CatalogSettings, EmbeddingSettings, GeneralSettings,
    IngestSettings, LlmSettings, PromptSettings, RoutingStrategy, SearchSettings, Settings,
    VectorStoreProvider, VectorStoreSettings,
};
