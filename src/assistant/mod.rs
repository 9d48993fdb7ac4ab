//! Answering questions about the course catalog.
//!
//! A turn starts with the user's question and ends with the model's reply.
//! With structured routing the model first extracts an intent, which is
//! planned and searched; the formatted results go back to the model as the
//! output of `query_courses` and the model writes the final answer. With
//! keyword routing the raw question is searched directly and the hits are
//! handed to the model as context.
//!
//! A failed model call or an unparseable extraction aborts the turn and
//! leaves the transcript as it was before the question. A failed search does
//! not: the model is told the search failed and answers anyway.

mod session;

pub use session::Session;

use crate::config::{AssistantPrompts, RoutingStrategy};
use crate::error::{CoursebotError, Result};
use crate::identity::{substitute_aliases, AliasRegistry, Identity, NameResolver, ResolutionMode};
use crate::llm::{
    parse_intent, query_courses_schema, Completion, FunctionSchema, LanguageModel, Message,
    QUERY_COURSES,
};
use crate::query::{format_results, QueryPlan, QueryPlanner, ResultDocument};
use crate::search::{Collection, SearchCollaborator};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Shown to the model in place of results when the search collaborator fails.
pub const SEARCH_ERROR_MESSAGE: &str = "An error occurred while searching for courses.";

/// The outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The model's final reply.
    pub reply: String,
    /// The plan the model's arguments produced, if it asked for a search.
    pub plan: Option<QueryPlan>,
    /// What was handed back to the model as search output.
    pub search_output: Option<String>,
}

impl Turn {
    fn direct(reply: String) -> Self {
        Self {
            reply,
            plan: None,
            search_output: None,
        }
    }
}

/// Drives conversation turns against a model and a search collaborator.
pub struct Assistant {
    model: Arc<dyn LanguageModel>,
    search: Arc<dyn SearchCollaborator>,
    planner: QueryPlanner,
    identities: Vec<Identity>,
    schema: FunctionSchema,
    prompts: AssistantPrompts,
    routing: RoutingStrategy,
    alias_substitution: bool,
    result_limit: usize,
    max_transcript_messages: usize,
}

impl Assistant {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        search: Arc<dyn SearchCollaborator>,
        registry: &AliasRegistry,
    ) -> Self {
        Self {
            model,
            search,
            planner: QueryPlanner::new(NameResolver::new(registry, ResolutionMode::Fuzzy)),
            identities: registry.list_identities().to_vec(),
            schema: query_courses_schema(),
            prompts: AssistantPrompts::default(),
            routing: RoutingStrategy::default(),
            alias_substitution: false,
            result_limit: 5,
            max_transcript_messages: 0,
        }
    }

    pub fn with_routing(mut self, routing: RoutingStrategy) -> Self {
        self.routing = routing;
        self
    }

    /// Rewrite known aliases to canonical names before the question is sent anywhere.
    pub fn with_alias_substitution(mut self, enabled: bool) -> Self {
        self.alias_substitution = enabled;
        self
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn with_prompts(mut self, prompts: AssistantPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Cap applied to sessions created by [`Assistant::new_session`].
    pub fn with_max_transcript_messages(mut self, max: usize) -> Self {
        self.max_transcript_messages = max;
        self
    }

    pub fn routing(&self) -> RoutingStrategy {
        self.routing
    }

    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    /// A fresh session seeded with the system prompt.
    pub fn new_session(&self) -> Session {
        Session::new(self.prompts.system.clone()).with_max_messages(self.max_transcript_messages)
    }

    /// Answer one question, extending the session's transcript.
    #[instrument(skip(self, session), fields(session = %session.id(), routing = %self.routing))]
    pub async fn answer(&self, session: &mut Session, question: &str) -> Result<Turn> {
        let question = if self.alias_substitution {
            substitute_aliases(question, &self.identities)
        } else {
            question.to_string()
        };
        info!("Processing question: {}", question);

        let checkpoint = session.checkpoint();
        let outcome = match self.routing {
            RoutingStrategy::Structured => self.answer_structured(session, &question).await,
            RoutingStrategy::Keyword => self.answer_keyword(session, &question).await,
        };

        match outcome {
            Ok(turn) => {
                session.trim();
                Ok(turn)
            }
            Err(e) => {
                warn!("Turn failed, discarding it: {}", e);
                session.rollback(checkpoint);
                Err(e)
            }
        }
    }

    async fn answer_structured(&self, session: &mut Session, question: &str) -> Result<Turn> {
        session.push(Message::user(question));

        let arguments = match self.model.complete(session.transcript(), Some(&self.schema)).await? {
            Completion::Text(reply) => {
                debug!("Model answered without searching");
                session.push(Message::assistant(reply.clone()));
                return Ok(Turn::direct(reply));
            }
            Completion::FunctionCall { name, arguments } if name == QUERY_COURSES => arguments,
            Completion::FunctionCall { name, .. } => {
                return Err(CoursebotError::Llm(format!(
                    "Model called unknown function '{}'",
                    name
                )));
            }
        };

        let intent = parse_intent(&arguments)?;
        let plan = self.planner.plan_intent(&intent);
        debug!("Planned {:?}", plan);

        let output = self.execute(&plan).await;
        session.push(Message::function(QUERY_COURSES, output.clone()));

        let reply = self.synthesize(session).await?;
        Ok(Turn {
            reply,
            plan: Some(plan),
            search_output: Some(output),
        })
    }

    async fn answer_keyword(&self, session: &mut Session, question: &str) -> Result<Turn> {
        session.push(Message::user(question));

        let collection = keyword_collection(question);
        let context = match self
            .search
            .query(collection, &[question.to_string()], self.result_limit)
            .await
        {
            Ok(documents) => self.keyword_context(&documents),
            Err(e) => {
                warn!("Search failed: {}", e);
                SEARCH_ERROR_MESSAGE.to_string()
            }
        };
        session.push(Message::assistant(context.clone()));

        let reply = self.synthesize(session).await?;
        Ok(Turn {
            reply,
            plan: None,
            search_output: Some(context),
        })
    }

    /// Ask the model for a plain-text reply to the transcript and record it.
    async fn synthesize(&self, session: &mut Session) -> Result<String> {
        match self.model.complete(session.transcript(), None).await? {
            Completion::Text(reply) => {
                session.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Completion::FunctionCall { name, .. } => Err(CoursebotError::Llm(format!(
                "Model called '{}' when a text reply was expected",
                name
            ))),
        }
    }

    /// Run a plan against the course collection and render the outcome.
    ///
    /// Invalid plans produce their message without searching. Search
    /// failures produce [`SEARCH_ERROR_MESSAGE`].
    #[instrument(skip(self))]
    pub async fn execute(&self, plan: &QueryPlan) -> String {
        match plan {
            QueryPlan::Invalid { message } => message.clone(),
            QueryPlan::Search {
                category,
                search_terms,
                display_term,
            } => match self
                .search
                .query(Collection::Courses, search_terms, self.result_limit)
                .await
            {
                Ok(documents) => format_results(*category, display_term, &documents),
                Err(e) => {
                    warn!("Search failed: {}", e);
                    SEARCH_ERROR_MESSAGE.to_string()
                }
            },
        }
    }

    fn keyword_context(&self, documents: &[ResultDocument]) -> String {
        if documents.is_empty() {
            return self.prompts.no_matches.clone();
        }

        let matches: Vec<String> = documents
            .iter()
            .map(|doc| format!("- {}", doc.render()))
            .collect();
        format!(
            "{}\n\n{}\n\n{}",
            self.prompts.matches_header,
            matches.join("\n"),
            self.prompts.matches_footer
        )
    }
}

/// Questions mentioning "instructor" search the instructor collection.
pub fn keyword_collection(question: &str) -> Collection {
    if question.to_lowercase().contains("instructor") {
        Collection::Instructors
    } else {
        Collection::Courses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_collection() {
        assert_eq!(keyword_collection("Who is the INSTRUCTOR for CS 110?"), Collection::Instructors);
        assert_eq!(keyword_collection("What CS courses are offered?"), Collection::Courses);
    }
}
