//! OpenAI-compatible client construction.
//!
//! Both the embedder and the answer generator talk to OpenAI-style endpoints. Groq, Ollama
//! and most hosted inference services expose the same API under a different base URL.

use crate::error::{Result, TubechatError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(api_base: &str, api_key_env: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
            api_key_env: api_key_env.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the API key from the configured environment variable.
    ///
    /// A missing key is not an error here; local servers often accept any key.
    pub fn api_key(&self) -> String {
        std::env::var(&self.api_key_env).unwrap_or_default()
    }
}

/// Create a client for the endpoint with its configured timeout.
pub fn create_client(endpoint: &Endpoint) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(endpoint.timeout)
        .build()
        .map_err(|e| TubechatError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(endpoint.api_base.trim_end_matches('/'))
        .with_api_key(endpoint.api_key());

    Ok(Client::with_config(config).with_http_client(http_client))
}
