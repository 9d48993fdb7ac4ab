//! Language model collaborator.
//!
//! The assistant talks to the model through the [`LanguageModel`] trait: a
//! transcript goes in, optionally with one function the model may call, and
//! either a function invocation or plain text comes back.

mod openai;
mod tools;

pub use openai::OpenAIChatModel;
pub use tools::{parse_intent, query_courses_schema, QUERY_COURSES};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

/// One entry in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Function name, for function-role messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// The output of a function call, tagged with the function's name.
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: content.into(),
            name: Some(name.into()),
        }
    }
}

/// A function the model may choose to call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// What the model returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The model invoked the offered function with raw JSON arguments.
    FunctionCall { name: String, arguments: String },
    /// The model answered in plain text.
    Text(String),
}

/// A chat completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete the transcript, optionally offering `function` for the model to call.
    async fn complete(
        &self,
        transcript: &[Message],
        function: Option<&FunctionSchema>,
    ) -> Result<Completion>;
}
