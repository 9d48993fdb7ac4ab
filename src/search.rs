//! Search over the course and instructor collections.
//!
//! [`SearchCollaborator`] is the narrow boundary the assistant and the
//! ingestor talk to. [`VectorSearch`] implements it by embedding each search
//! term and ranking stored documents by similarity.

use crate::embedding::Embedder;
use crate::error::{CoursebotError, Result};
use crate::query::ResultDocument;
use crate::vector_store::{Document, VectorStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default collection holding one document per course row.
pub const DEFAULT_COURSE_COLLECTION: &str = "courses-collection";
/// Default collection holding one document per distinct instructor.
pub const DEFAULT_INSTRUCTOR_COLLECTION: &str = "instructors-collection";

/// The two logical collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Courses,
    Instructors,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Courses => write!(f, "courses"),
            Collection::Instructors => write!(f, "instructors"),
        }
    }
}

/// Store-level names for each logical collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    pub courses: String,
    pub instructors: String,
}

impl CollectionNames {
    pub fn new(courses: impl Into<String>, instructors: impl Into<String>) -> Self {
        Self {
            courses: courses.into(),
            instructors: instructors.into(),
        }
    }

    pub fn name(&self, collection: Collection) -> &str {
        match collection {
            Collection::Courses => &self.courses,
            Collection::Instructors => &self.instructors,
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self::new(DEFAULT_COURSE_COLLECTION, DEFAULT_INSTRUCTOR_COLLECTION)
    }
}

/// A document to be written, before it is embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub id: String,
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

impl NewDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Query and write access to the two collections.
#[async_trait]
pub trait SearchCollaborator: Send + Sync {
    /// Up to `limit` documents per search term, best first, without duplicates.
    async fn query(
        &self,
        collection: Collection,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<ResultDocument>>;

    /// Insert or replace documents by id. Returns how many were written.
    async fn upsert(&self, collection: Collection, documents: &[NewDocument]) -> Result<usize>;

    /// Number of documents in a collection.
    async fn count(&self, collection: Collection) -> Result<usize>;

    /// Remove every document from a collection. Returns how many were removed.
    async fn clear(&self, collection: Collection) -> Result<usize>;
}

/// Embedding-backed search over a [`VectorStore`].
pub struct VectorSearch {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    names: CollectionNames,
}

impl VectorSearch {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        names: CollectionNames,
    ) -> Self {
        Self {
            store,
            embedder,
            names,
        }
    }

    pub fn names(&self) -> &CollectionNames {
        &self.names
    }
}

#[async_trait]
impl SearchCollaborator for VectorSearch {
    #[instrument(skip(self, terms), fields(terms = terms.len()))]
    async fn query(
        &self,
        collection: Collection,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<ResultDocument>> {
        let name = self.names.name(collection);
        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for term in terms {
            let embedding = self
                .embedder
                .embed(term)
                .await
                .map_err(|e| CoursebotError::Search(e.to_string()))?;
            let hits = self
                .store
                .search(name, &embedding, limit)
                .await
                .map_err(|e| CoursebotError::Search(e.to_string()))?;

            debug!("Term '{}' matched {} documents in {}", term, hits.len(), name);

            for hit in hits {
                if seen.insert(hit.document.id.clone()) {
                    documents.push(ResultDocument::from(hit.document.content));
                }
            }
        }

        Ok(documents)
    }

    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    async fn upsert(&self, collection: Collection, documents: &[NewDocument]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(CoursebotError::Embedding(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let docs: Vec<Document> = documents
            .iter()
            .zip(embeddings)
            .map(|(doc, embedding)| {
                Document::new(doc.id.clone(), doc.content.clone(), doc.metadata.clone(), embedding)
            })
            .collect();

        self.store.upsert_batch(self.names.name(collection), &docs).await
    }

    async fn count(&self, collection: Collection) -> Result<usize> {
        self.store.count(self.names.name(collection)).await
    }

    async fn clear(&self, collection: Collection) -> Result<usize> {
        self.store.clear(self.names.name(collection)).await
    }
}
