//! In-process collaborators for end-to-end tests.

#![allow(dead_code)]

use async_trait::async_trait;
use coursebot::embedding::Embedder;
use coursebot::error::{CoursebotError, Result};
use coursebot::llm::{Completion, FunctionSchema, LanguageModel, Message};
use coursebot::query::ResultDocument;
use coursebot::search::{
    Collection, CollectionNames, NewDocument, SearchCollaborator, VectorSearch,
};
use coursebot::vector_store::MemoryVectorStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded call to the model.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub transcript: Vec<Message>,
    pub offered_function: Option<String>,
}

/// Replays queued completions and records what it was asked.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<Completion>>>,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<Completion>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn call(arguments: &str) -> Result<Completion> {
    Ok(Completion::FunctionCall {
        name: "query_courses".to_string(),
        arguments: arguments.to_string(),
    })
}

pub fn text(reply: &str) -> Result<Completion> {
    Ok(Completion::Text(reply.to_string()))
}

pub fn llm_error() -> Result<Completion> {
    Err(CoursebotError::Llm("connection reset".to_string()))
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(
        &self,
        transcript: &[Message],
        function: Option<&FunctionSchema>,
    ) -> Result<Completion> {
        self.calls.lock().unwrap().push(ModelCall {
            transcript: transcript.to_vec(),
            offered_function: function.map(|f| f.name.clone()),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CoursebotError::Llm("script exhausted".to_string())))
    }
}

/// Embeds text as lowercase letter counts, so shared words score higher.
pub struct LetterEmbedder;

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0; 26];
        for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
        Ok(v)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        26
    }
}

pub fn memory_search() -> Arc<VectorSearch> {
    Arc::new(VectorSearch::new(
        Arc::new(MemoryVectorStore::new()),
        Arc::new(LetterEmbedder),
        CollectionNames::default(),
    ))
}

/// Wraps a search collaborator and counts queries; can be told to fail.
pub struct CountingSearch {
    inner: Arc<dyn SearchCollaborator>,
    fail_queries: bool,
    fail_writes_for: Option<String>,
    pub queries: AtomicUsize,
    pub last_query: Mutex<Option<(Collection, Vec<String>)>>,
}

impl CountingSearch {
    pub fn new(inner: Arc<dyn SearchCollaborator>) -> Self {
        Self {
            inner,
            fail_queries: false,
            fail_writes_for: None,
            queries: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Every write of document `id` fails.
    pub fn failing_writes_for(mut self, id: &str) -> Self {
        self.fail_writes_for = Some(id.to_string());
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchCollaborator for CountingSearch {
    async fn query(
        &self,
        collection: Collection,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<ResultDocument>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some((collection, terms.to_vec()));
        if self.fail_queries {
            return Err(CoursebotError::Search("collection unavailable".to_string()));
        }
        self.inner.query(collection, terms, limit).await
    }

    async fn upsert(&self, collection: Collection, documents: &[NewDocument]) -> Result<usize> {
        if let Some(id) = &self.fail_writes_for {
            if documents.iter().any(|d| &d.id == id) {
                return Err(CoursebotError::VectorStore("write rejected".to_string()));
            }
        }
        self.inner.upsert(collection, documents).await
    }

    async fn count(&self, collection: Collection) -> Result<usize> {
        self.inner.count(collection).await
    }

    async fn clear(&self, collection: Collection) -> Result<usize> {
        self.inner.clear(collection).await
    }
}
