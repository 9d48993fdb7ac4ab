//! Prompt templates for Coursebot.
//!
//! Prompts can be customized by placing an `assistant.toml` file in the
//! custom prompts directory.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub assistant: AssistantPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts used during a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    /// First message of every transcript.
    pub system: String,
    /// Keyword routing: opens the list of matches.
    pub matches_header: String,
    /// Keyword routing: closes the list of matches.
    pub matches_footer: String,
    /// Keyword routing: used instead of matches when the search finds nothing.
    pub no_matches: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: "You are a course assistant. Help users find course information.".to_string(),
            matches_header: "Based on the available information, here are the relevant matches:"
                .to_string(),
            matches_footer: "Please use this information to answer the user's question."
                .to_string(),
            no_matches:
                "Provide accurate information based on the context of university courses and instructors."
                    .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// The assistant prompts with config variables substituted.
    pub fn rendered_assistant(&self) -> AssistantPrompts {
        let render = |template: &str| Self::render(template, &self.variables);
        AssistantPrompts {
            system: render(&self.assistant.system),
            matches_header: render(&self.assistant.matches_header),
            matches_footer: render(&self.assistant.matches_footer),
            no_matches: render(&self.assistant.no_matches),
        }
    }
}
