//! Answer generation.
//!
//! The pipeline only needs single-shot text completion: one prompt in, one string out.
//! Backends are swappable behind [`Generator`].

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for language-model backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete `prompt`. No retries; failures surface as `TubechatError::Generation`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for display.
    fn model_name(&self) -> &str;
}
