//! OpenAI chat completions backend.

use super::{Completion, FunctionSchema, LanguageModel, Message, Role};
use crate::error::{CoursebotError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionFunctionsArgs, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestFunctionMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat model backed by the OpenAI API, using function calling for extraction.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    /// Create a model client for `model` authenticated with `api_key`.
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(api_key, timeout)?,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn build_error(e: impl std::fmt::Display) -> CoursebotError {
    CoursebotError::Llm(format!("Failed to build request: {}", e))
}

#[allow(deprecated)]
fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.clone();
    let request = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(build_error)?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(build_error)?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(build_error)?
            .into(),
        Role::Function => ChatCompletionRequestMessage::Function(
            ChatCompletionRequestFunctionMessageArgs::default()
                .name(message.name.clone().unwrap_or_default())
                .content(content)
                .build()
                .map_err(build_error)?,
        ),
    };
    Ok(request)
}

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    #[allow(deprecated)]
    #[instrument(skip_all, fields(model = %self.model, messages = transcript.len(), with_function = function.is_some()))]
    async fn complete(
        &self,
        transcript: &[Message],
        function: Option<&FunctionSchema>,
    ) -> Result<Completion> {
        let messages = transcript
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(&self.model).messages(messages);

        if let Some(schema) = function {
            let definition = ChatCompletionFunctionsArgs::default()
                .name(schema.name.clone())
                .description(schema.description.clone())
                .parameters(schema.parameters.clone())
                .build()
                .map_err(build_error)?;
            request.functions(vec![definition]);
        }

        let request = request.build().map_err(build_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CoursebotError::Llm(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CoursebotError::Llm("No choices in model response".to_string()))?;

        if let Some(call) = choice.message.function_call {
            debug!("Model called {} with {}", call.name, call.arguments);
            return Ok(Completion::FunctionCall {
                name: call.name,
                arguments: call.arguments,
            });
        }

        if let Some(call) = choice.message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            debug!("Model called tool {} with {}", call.function.name, call.function.arguments);
            return Ok(Completion::FunctionCall {
                name: call.function.name,
                arguments: call.function.arguments,
            });
        }

        choice
            .message
            .content
            .map(Completion::Text)
            .ok_or_else(|| CoursebotError::Llm("Empty response from model".to_string()))
    }
}
