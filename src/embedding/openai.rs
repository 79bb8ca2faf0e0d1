//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{Result, TubechatError};
use crate::openai::{create_client, Endpoint};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Default number of texts sent per embeddings request.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Embedder backed by an OpenAI-compatible embeddings endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAIEmbedder {
    /// Create a new embedder with custom endpoint, model and dimensions.
    pub fn with_config(endpoint: &Endpoint, model: &str, dimensions: usize) -> Result<Self> {
        Ok(Self {
            client: create_client(endpoint)?,
            model: model.to_string(),
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Set the maximum number of texts per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| TubechatError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let input: Vec<String> = chunk.to_vec();

            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(input))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| TubechatError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self.client.embeddings().create(request).await.map_err(|e| {
                TubechatError::Embedding(format!("Embedding API error: {}", e))
            })?;

            if response.data.len() != chunk.len() {
                return Err(TubechatError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                if embedding_data.embedding.len() != self.dimensions {
                    return Err(TubechatError::Embedding(format!(
                        "Model returned {} dimensions, expected {}",
                        embedding_data.embedding.len(),
                        self.dimensions
                    )));
                }
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let endpoint = Endpoint::new("https://api.openai.com/v1", "OPENAI_API_KEY");
        let embedder = OpenAIEmbedder::with_config(&endpoint, "text-embedding-3-small", 1536).unwrap();
        assert_eq!(embedder.dimensions(), 1536);

        let endpoint = Endpoint::new("http://localhost:11434/v1", "OPENAI_API_KEY");
        let embedder = OpenAIEmbedder::with_config(&endpoint, "text-embedding-3-large", 3072)
            .unwrap()
            .with_batch_size(0);
        assert_eq!(embedder.dimensions(), 3072);
        assert_eq!(embedder.batch_size, 1);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let endpoint = Endpoint::new("http://127.0.0.1:9/v1", "OPENAI_API_KEY");
        let embedder = OpenAIEmbedder::with_config(&endpoint, "text-embedding-3-small", 8).unwrap();
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
