//! Chat-completions backend for OpenAI-compatible APIs (Groq by default).

use super::Generator;
use crate::config::Settings;
use crate::error::{Result, TubechatError};
use crate::openai::{create_client, Endpoint};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Generator that sends the prompt as a single user message.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a generator for `model` at `temperature`.
    pub fn new(endpoint: &Endpoint, model: &str, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: create_client(endpoint)?,
            model: model.to_string(),
            temperature,
        })
    }

    /// Create a generator from the `generation` settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.generation_endpoint(),
            &settings.generation.model,
            settings.generation.temperature,
        )
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| TubechatError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| TubechatError::Generation(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            TubechatError::Generation(format!("Chat API error: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TubechatError::Generation("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = Settings::default();
        let generator = OpenAIGenerator::from_settings(&settings).unwrap();
        assert_eq!(generator.model_name(), "llama-3.3-70b-versatile");
        assert!((generator.temperature - 0.2).abs() < f32::EPSILON);

        let mut settings = Settings::default();
        settings.generation.model = "llama-3.1-8b-instant".to_string();
        let generator = OpenAIGenerator::from_settings(&settings).unwrap();
        assert_eq!(generator.model_name(), "llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_generation_error() {
        let endpoint = Endpoint::new("http://127.0.0.1:9/v1", "TUBECHAT_MISSING_KEY_VAR")
            .with_timeout(std::time::Duration::from_secs(2));
        let generator = OpenAIGenerator::new(&endpoint, "test-model", 0.0).unwrap();

        let err = generator.generate("hello").await.unwrap_err();
        assert!(matches!(err, TubechatError::Generation(_)));
    }
}
