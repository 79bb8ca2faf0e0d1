//! Local sentence-transformer embeddings via fastembed.
//!
//! Models run on the CPU through ONNX Runtime and are downloaded to the cache directory on
//! first use. No API key is needed.

use super::Embedder;
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, instrument};

/// Supported local models: config name, fastembed model, output dimensions.
const LOCAL_MODELS: [(&str, EmbeddingModel, usize); 5] = [
    ("all-MiniLM-L6-v2", EmbeddingModel::AllMiniLML6V2, 384),
    ("all-MiniLM-L12-v2", EmbeddingModel::AllMiniLML12V2, 384),
    ("bge-small-en-v1.5", EmbeddingModel::BGESmallENV15, 384),
    ("paraphrase-multilingual-MiniLM-L12-v2", EmbeddingModel::ParaphraseMLMiniLML12V2, 384),
    ("multilingual-e5-small", EmbeddingModel::MultilingualE5Small, 384),
];

/// Look up a local model by its config name (case-insensitive, `sentence-transformers/`
/// prefix allowed).
fn lookup(name: &str) -> Option<(EmbeddingModel, usize)> {
    let name = name.trim();
    let name = name.strip_prefix("sentence-transformers/").unwrap_or(name);
    LOCAL_MODELS
        .iter()
        .find(|(known, _, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, model, dims)| (model.clone(), *dims))
}

/// Embedder backed by a local fastembed model, loaded lazily on first use.
pub struct LocalEmbedder {
    name: String,
    model: EmbeddingModel,
    dimensions: usize,
    cache_dir: PathBuf,
    show_download_progress: bool,
    instance: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl LocalEmbedder {
    /// Create an embedder for a named model. The model is not loaded until first use.
    pub fn new(name: &str, cache_dir: PathBuf) -> Result<Self> {
        let (model, dimensions) = lookup(name).ok_or_else(|| {
            let known: Vec<&str> = LOCAL_MODELS.iter().map(|(n, _, _)| *n).collect();
            TubechatError::Config(format!(
                "Unknown local embedding model: {} (expected one of: {})",
                name,
                known.join(", ")
            ))
        })?;

        Ok(Self {
            name: name.to_string(),
            model,
            dimensions,
            cache_dir,
            show_download_progress: true,
            instance: OnceCell::new(),
        })
    }

    /// Toggle the download progress bar shown on first use.
    pub fn with_download_progress(mut self, show: bool) -> Self {
        self.show_download_progress = show;
        self
    }

    /// Get or initialize the embedding model.
    async fn get_model(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
        self.instance
            .get_or_try_init(|| async {
                info!("Loading local embedding model {}", self.name);
                let options = InitOptions::new(self.model.clone())
                    .with_cache_dir(self.cache_dir.clone())
                    .with_show_download_progress(self.show_download_progress);

                tokio::task::spawn_blocking(move || {
                    TextEmbedding::try_new(options)
                        .map(|model| Arc::new(Mutex::new(model)))
                        .map_err(|e| TubechatError::Embedding(format!("Failed to load model: {}", e)))
                })
                .await
                .map_err(|e| TubechatError::Embedding(format!("Model load task failed: {}", e)))?
            })
            .await
            .map(Arc::clone)
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TubechatError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.get_model().await?;
        let input = texts.to_vec();

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut model = model.blocking_lock();
            model.embed(input, None)
        })
        .await
        .map_err(|e| TubechatError::Embedding(format!("Embedding task failed: {}", e)))?
        .map_err(|e| TubechatError::Embedding(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(TubechatError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(TubechatError::Embedding(format!(
                "Model returned {} dimensions, expected {}",
                bad.len(),
                self.dimensions
            )));
        }

        debug!("Generated {} local embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
