//! OpenAI client configuration.

use crate::error::{CoursebotError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable checked when the configured key variable is unset.
pub const FALLBACK_KEY_ENV: &str = "OPENAI_API_KEY";

/// Read the API key from `key_env`, falling back to `OPENAI_API_KEY`.
pub fn api_key(key_env: &str) -> Result<String> {
    [key_env, FALLBACK_KEY_ENV]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            CoursebotError::Config(format!(
                "{} not set. Set it with: export {}='sk-...'",
                key_env, key_env
            ))
        })
}

/// Create an OpenAI client for the given key with the default timeout.
pub fn create_client(api_key: &str) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(api_key: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new().with_api_key(api_key);
    Ok(Client::with_config(config).with_http_client(http_client))
}
