//! Configuration settings for Tubechat.

use crate::error::{Result, TubechatError};
use crate::openai::Endpoint;
use crate::transcript::Language;
use crate::vector_store::{SearchType, SimilarityMetric};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcript: TranscriptSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when neither `-v` nor `RUST_LOG` is given.
    pub log_level: String,
    /// Timeout in seconds for outbound HTTP requests.
    pub request_timeout_seconds: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            request_timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Transcript source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Default caption language preference.
    pub language: Language,
    /// Path or name of the yt-dlp binary.
    pub ytdlp_path: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            language: Language::English,
            ytdlp_path: "yt-dlp".to_string(),
        }
    }
}

/// Text splitting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (local, openai, hash).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Where local models are downloaded (defaults to the user cache directory).
    pub cache_dir: Option<String>,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Base URL of the OpenAI-compatible embeddings API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum texts per embeddings request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            cache_dir: None,
            dimensions: 384,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 100,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat model used for answers.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Base URL of the OpenAI-compatible chat API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.2,
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

/// Retrieval policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Search type (similarity, similarity_score_threshold, mmr).
    pub search_type: String,
    /// Number of chunks returned per query.
    pub k: usize,
    /// Similarity metric (cosine, dot, euclidean).
    pub metric: SimilarityMetric,
    /// Minimum score for `similarity_score_threshold`.
    pub score_threshold: f32,
    /// Candidate pool size for `mmr`.
    pub fetch_k: usize,
    /// Relevance/diversity trade-off for `mmr` (1.0 = pure relevance).
    pub lambda_mult: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            search_type: "similarity".to_string(),
            k: 4,
            metric: SimilarityMetric::Cosine,
            score_threshold: 0.3,
            fetch_k: 20,
            lambda_mult: 0.5,
        }
    }
}

impl RetrievalSettings {
    /// Resolve the configured search type with its parameters.
    pub fn search_type(&self) -> Result<SearchType> {
        match self.search_type.to_lowercase().as_str() {
            "similarity" => Ok(SearchType::Similarity),
            "similarity_score_threshold" | "threshold" => Ok(SearchType::ScoreThreshold {
                min_score: self.score_threshold,
            }),
            "mmr" => Ok(SearchType::Mmr {
                fetch_k: self.fetch_k.max(self.k),
                lambda_mult: self.lambda_mult.clamp(0.0, 1.0),
            }),
            other => Err(TubechatError::Config(format!("Unknown search type: {}", other))),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory holding a `rag.toml` that overrides the built-in templates.
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(TubechatError::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(TubechatError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.k == 0 {
            return Err(TubechatError::Config("retrieval.k must be positive".to_string()));
        }
        if self.embedding.dimensions == 0 {
            return Err(TubechatError::Config("embedding.dimensions must be positive".to_string()));
        }
        if self.embedding.batch_size == 0 {
            return Err(TubechatError::Config("embedding.batch_size must be positive".to_string()));
        }
        self.retrieval.search_type()?;
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| TubechatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubechat")
            .join("config.toml")
    }

    /// Directory for downloaded local embedding models.
    pub fn model_cache_dir(&self) -> PathBuf {
        match &self.embedding.cache_dir {
            Some(dir) => Self::expand_path(dir),
            None => dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tubechat")
                .join("models"),
        }
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Timeout applied to every outbound HTTP request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.general.request_timeout_seconds)
    }

    /// Endpoint for the embeddings API.
    pub fn embedding_endpoint(&self) -> Endpoint {
        Endpoint::new(&self.embedding.api_base, &self.embedding.api_key_env)
            .with_timeout(self.request_timeout())
    }

    /// Endpoint for the chat completions API.
    pub fn generation_endpoint(&self) -> Endpoint {
        Endpoint::new(&self.generation.api_base, &self.generation.api_key_env)
            .with_timeout(self.request_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.retrieval.k, 4);
        assert_eq!(settings.generation.model, "llama-3.3-70b-versatile");
        assert!((settings.generation.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.embedding.provider, "local");
        assert_eq!(settings.embedding.model, "all-MiniLM-L6-v2");
        assert_eq!(settings.embedding.dimensions, 384);
    }

    #[test]
    fn test_zero_embedding_dimensions_rejected() {
        for provider in ["openai", "local", "hash"] {
            let mut settings = Settings::default();
            settings.embedding.provider = provider.to_string();
            settings.embedding.dimensions = 0;
            assert!(matches!(settings.validate(), Err(TubechatError::Config(_))));
        }
    }

    #[test]
    fn test_model_cache_dir() {
        let mut settings = Settings::default();
        assert!(settings.model_cache_dir().ends_with("tubechat/models"));

        settings.embedding.cache_dir = Some("/tmp/tubechat-models".to_string());
        assert_eq!(settings.model_cache_dir(), PathBuf::from("/tmp/tubechat-models"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let mut settings = Settings::default();
        settings.chunking.chunk_overlap = 1000;
        assert!(matches!(settings.validate(), Err(TubechatError::Config(_))));
    }

    #[test]
    fn test_unknown_search_type_rejected() {
        let mut settings = Settings::default();
        settings.retrieval.search_type = "hybrid".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_mmr_fetch_k_at_least_k() {
        let mut settings = Settings::default();
        settings.retrieval.search_type = "mmr".to_string();
        settings.retrieval.fetch_k = 2;
        settings.retrieval.k = 6;
        match settings.retrieval.search_type().unwrap() {
            SearchType::Mmr { fetch_k, .. } => assert_eq!(fetch_k, 6),
            other => panic!("unexpected search type: {:?}", other),
        }
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[chunking]\nchunk_size = 500\nchunk_overlap = 50\n\n[transcript]\nlanguage = \"hindi_auto\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.chunk_overlap, 50);
        assert_eq!(settings.transcript.language, Language::HindiAuto);
        assert_eq!(settings.retrieval.k, 4);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.retrieval.k = 7;
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.retrieval.k, 7);
    }
}
