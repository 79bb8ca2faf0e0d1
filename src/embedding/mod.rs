//! Embedding generation for semantic retrieval.

mod hashing;
#[cfg(feature = "local-embeddings")]
mod local;
mod openai;

pub use hashing::HashEmbedder;
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::Settings;
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
///
/// Implementations must be deterministic for a given configuration, and `embed_batch`
/// must return exactly one vector per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder selected by `embedding.provider`.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let embedding = &settings.embedding;
    let embedder: Arc<dyn Embedder> = match embedding.provider.to_lowercase().as_str() {
        #[cfg(feature = "local-embeddings")]
        "local" => Arc::new(LocalEmbedder::new(&embedding.model, settings.model_cache_dir())?),
        #[cfg(not(feature = "local-embeddings"))]
        "local" => {
            return Err(TubechatError::Config(
                "Built without the local-embeddings feature; set embedding.provider = \"openai\""
                    .to_string(),
            ))
        }
        "openai" => Arc::new(
            OpenAIEmbedder::with_config(
                &settings.embedding_endpoint(),
                &embedding.model,
                embedding.dimensions as usize,
            )?
            .with_batch_size(embedding.batch_size),
        ),
        "hash" => Arc::new(HashEmbedder::new(embedding.dimensions as usize)?),
        other => {
            return Err(TubechatError::Config(format!(
                "Unknown embedding provider: {}",
                other
            )))
        }
    };

    if embedder.dimensions() != embedding.dimensions as usize {
        return Err(TubechatError::Config(format!(
            "embedding.dimensions is {} but {} produces {}",
            embedding.dimensions,
            embedding.model,
            embedder.dimensions()
        )));
    }
    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_embedder() {
        let mut settings = Settings::default();
        settings.embedding.provider = "hash".to_string();
        settings.embedding.dimensions = 256;
        let embedder = create_embedder(&settings).unwrap();
        assert_eq!(embedder.dimensions(), 256);

        settings.embedding.provider = "openai".to_string();
        settings.embedding.model = "text-embedding-3-small".to_string();
        assert_eq!(create_embedder(&settings).unwrap().dimensions(), 256);

        settings.embedding.provider = "word2vec".to_string();
        assert!(create_embedder(&settings).is_err());
    }

    #[cfg(feature = "local-embeddings")]
    #[test]
    fn test_default_is_local_minilm() {
        let settings = Settings::default();
        let embedder = create_embedder(&settings).unwrap();
        assert_eq!(embedder.dimensions(), 384);
    }

    #[cfg(feature = "local-embeddings")]
    #[test]
    fn test_local_dimension_mismatch_rejected() {
        let mut settings = Settings::default();
        settings.embedding.dimensions = 1536;
        let err = create_embedder(&settings).err().unwrap();
        assert!(matches!(err, TubechatError::Config(_)));
    }
}
