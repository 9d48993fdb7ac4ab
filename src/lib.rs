//! Coursebot - course catalog question answering
//!
//! A CLI tool that indexes a semester schedule export and answers questions
//! about courses and instructors with an LLM.
//!
//! # Overview
//!
//! Coursebot allows you to:
//! - Index a tab-delimited schedule export into course and instructor collections
//! - Ask questions in plain language ("What CS courses does Phil Peterson teach?")
//! - Resolve informal instructor names to their canonical form
//! - Search the catalog directly by instructor, subject, or title
//!
//! # Architecture
//!
//! - `identity` - Alias registry and name resolution
//! - `catalog` - Schedule export records
//! - `query` - Intents, query planning, and result formatting
//! - `llm` - Language model boundary and function schema
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `search` - Search over the two collections
//! - `retry` - Bounded retry with backoff
//! - `ingest` - Populating the collections
//! - `assistant` - Conversation sessions and turns
//! - `orchestrator` - Component wiring from settings
//!
//! # Example
//!
//! ```rust,no_run
//! use coursebot::config::Settings;
//! use coursebot::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let assistant = orchestrator.assistant();
//!     let mut session = assistant.new_session();
//!     let turn = assistant
//!         .answer(&mut session, "Which CS courses does Phil Peterson teach?")
//!         .await?;
//!     println!("{}", turn.reply);
//!
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod query;
pub mod retry;
pub mod search;
pub mod vector_store;

pub use error::{CoursebotError, Result};
