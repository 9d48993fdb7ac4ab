//! Component wiring for Coursebot.
//!
//! Builds the model, search, and alias components from [`Settings`] and
//! hands out assistants and ingestors that share them.

use crate::assistant::Assistant;
use crate::catalog::Catalog;
use crate::config::{Prompts, Settings, VectorStoreProvider};
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::identity::{AliasRegistry, NameResolver, ResolutionMode};
use crate::ingest::Ingestor;
use crate::llm::{LanguageModel, OpenAIChatModel};
use crate::openai::api_key;
use crate::search::{SearchCollaborator, VectorSearch};
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use tracing::info;

/// Shared components for one process.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    registry: AliasRegistry,
    model: Arc<dyn LanguageModel>,
    search: Arc<dyn SearchCollaborator>,
}

impl Orchestrator {
    /// Build every component from settings.
    ///
    /// Fails if the API key is missing, the alias table is invalid, or the
    /// vector store cannot be opened.
    pub fn new(settings: Settings) -> Result<Self> {
        let key = api_key(&settings.llm.api_key_env)?;

        let model: Arc<dyn LanguageModel> = Arc::new(OpenAIChatModel::new(
            &key,
            &settings.llm.model,
            settings.llm_timeout(),
        )?);

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &key,
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?);

        let store: Arc<dyn VectorStore> = match settings.vector_store.provider {
            VectorStoreProvider::Sqlite => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
            VectorStoreProvider::Memory => {
                info!("Using in-memory vector store; the index will not persist");
                Arc::new(MemoryVectorStore::new())
            }
        };

        let search: Arc<dyn SearchCollaborator> =
            Arc::new(VectorSearch::new(store, embedder, settings.collection_names()));

        Self::with_components(settings, model, search)
    }

    /// Assemble from pre-built collaborators.
    pub fn with_components(
        settings: Settings,
        model: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchCollaborator>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let registry = settings.alias_registry()?;

        Ok(Self {
            settings,
            prompts,
            registry,
            model,
            search,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &AliasRegistry {
        &self.registry
    }

    pub fn search(&self) -> Arc<dyn SearchCollaborator> {
        self.search.clone()
    }

    /// A resolver over the configured alias table.
    pub fn resolver(&self, mode: ResolutionMode) -> NameResolver {
        NameResolver::new(&self.registry, mode)
    }

    /// An assistant configured from the `assistant`, `search`, and `prompts` sections.
    pub fn assistant(&self) -> Assistant {
        let config = &self.settings.assistant;
        Assistant::new(self.model.clone(), self.search.clone(), &self.registry)
            .with_routing(config.routing)
            .with_alias_substitution(config.alias_substitution)
            .with_max_transcript_messages(config.max_transcript_messages)
            .with_result_limit(self.settings.search.result_limit)
            .with_prompts(self.prompts.rendered_assistant())
    }

    /// Resolver used when indexing. Names from the export are matched exactly
    /// and kept as written otherwise, so an unknown instructor is never folded
    /// into a known identity.
    fn indexing_resolver(&self) -> NameResolver {
        self.resolver(ResolutionMode::Exact)
    }

    /// An ingestor configured from the `ingest` section.
    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(self.search.clone(), self.indexing_resolver())
            .with_retry_policy(self.settings.ingest.retry_policy())
            .with_concurrency(self.settings.ingest.concurrency)
    }

    /// Read the configured schedule export.
    pub fn load_catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.settings.catalog_path(), &self.indexing_resolver())
    }
}
