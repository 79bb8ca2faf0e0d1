//! Pipeline orchestrator for Tubechat.
//!
//! Coordinates the process from transcript fetch to a queryable session.

use crate::chunking::TextSplitter;
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{Result, TubechatError};
use crate::generation::{Generator, OpenAIGenerator};
use crate::rag::RagSession;
use crate::transcript::{parse_video_id, Language, LocalTranscript, TranscriptSource, YoutubeCaptions};
use crate::vector_store::{Retriever, VectorIndex};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of loading a video.
pub enum LoadOutcome {
    /// The transcript was indexed and can be queried.
    Ready(RagSession),
    /// No captions exist for the requested language preference.
    Unavailable,
}

impl LoadOutcome {
    /// Convert into a session, treating an unavailable transcript as an error.
    pub fn into_session(self, video: &str) -> Result<RagSession> {
        match self {
            LoadOutcome::Ready(session) => Ok(session),
            LoadOutcome::Unavailable => Err(TubechatError::TranscriptUnavailable(video.to_string())),
        }
    }
}

/// Builds [`RagSession`]s from video IDs, URLs or local transcript files.
pub struct Loader {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    youtube: Arc<dyn TranscriptSource>,
    local: Arc<LocalTranscript>,
}

impl Loader {
    /// Create a loader with the configured providers.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        let embedder = create_embedder(&settings)?;

        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::from_settings(&settings)?);
        info!(
            "Using {} for generation (temperature {})",
            generator.model_name(),
            settings.generation.temperature
        );

        let youtube: Arc<dyn TranscriptSource> = Arc::new(YoutubeCaptions::with_config(
            &settings.transcript.ytdlp_path,
            settings.request_timeout(),
        )?);

        Ok(Self {
            settings,
            prompts,
            embedder,
            generator,
            youtube,
            local: Arc::new(LocalTranscript::new()),
        })
    }

    /// Create a loader with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        youtube: Arc<dyn TranscriptSource>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            generator,
            youtube,
            local: Arc::new(LocalTranscript::new()),
        }
    }

    /// Resolve `input` to a transcript source and the key to fetch with.
    fn resolve(&self, input: &str) -> Result<(Arc<dyn TranscriptSource>, String)> {
        let trimmed = input.trim();
        if self.local.can_handle(trimmed) {
            let local: Arc<dyn TranscriptSource> = self.local.clone();
            return Ok((local, trimmed.to_string()));
        }

        match parse_video_id(trimmed) {
            Some(id) => Ok((self.youtube.clone(), id)),
            None => Err(TubechatError::InvalidInput(format!(
                "Not a YouTube URL, video ID or transcript file: {}",
                input
            ))),
        }
    }

    /// Fetch the raw transcript text for `input`.
    pub async fn fetch_transcript(&self, input: &str, language: Language) -> Result<Option<String>> {
        let (source, key) = self.resolve(input)?;
        source.fetch(&key, language).await
    }

    /// Fetch, chunk and index a transcript, returning a ready session.
    #[instrument(skip(self))]
    pub async fn load(&self, input: &str, language: Language) -> Result<LoadOutcome> {
        let (source, key) = self.resolve(input)?;

        info!("Fetching {} transcript for {}", language, key);
        let transcript = match source.fetch(&key, language).await? {
            Some(text) => text,
            None => {
                warn!("No {} transcript available for {}", language, key);
                return Ok(LoadOutcome::Unavailable);
            }
        };

        self.index_text(&key, &transcript).await.map(LoadOutcome::Ready)
    }

    /// Chunk and index already-fetched transcript text.
    pub async fn index_text(&self, video_id: &str, transcript: &str) -> Result<RagSession> {
        let splitter = TextSplitter::new(
            self.settings.chunking.chunk_size,
            self.settings.chunking.chunk_overlap,
        )?;
        let chunks = splitter.split(transcript);
        info!(
            "Split {} chars into {} chunks",
            transcript.chars().count(),
            chunks.len()
        );

        let index = VectorIndex::build(
            chunks,
            self.embedder.as_ref(),
            self.settings.retrieval.metric,
        )
        .await?;

        let retriever = Retriever::new(Arc::new(index), self.embedder.clone())
            .with_k(self.settings.retrieval.k)
            .with_search_type(self.settings.retrieval.search_type()?);

        Ok(RagSession::new(video_id, retriever, self.generator.clone())
            .with_prompts(self.prompts.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use async_trait::async_trait;
    use std::io::Write;

    struct FixedSource(Option<String>);

    #[async_trait]
    impl TranscriptSource for FixedSource {
        async fn fetch(&self, _video_id: &str, _language: Language) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn loader(transcript: Option<&str>) -> Loader {
        let mut settings = Settings::default();
        settings.chunking.chunk_size = 100;
        settings.chunking.chunk_overlap = 20;
        Loader::with_components(
            settings,
            Prompts::default(),
            Arc::new(HashEmbedder::new(128).unwrap()),
            Arc::new(EchoGenerator),
            Arc::new(FixedSource(transcript.map(String::from))),
        )
    }

    #[tokio::test]
    async fn test_load_ready() {
        let text = "Alice said hello. Bob replied hi. ".repeat(10);
        let outcome = loader(Some(&text))
            .load("https://youtu.be/dQw4w9WgXcQ", Language::English)
            .await
            .unwrap();

        let session = outcome.into_session("dQw4w9WgXcQ").unwrap();
        assert_eq!(session.video_id(), "dQw4w9WgXcQ");
        assert!(session.chunk_count() > 1);
        assert_eq!(session.retriever().k(), 4);

        let answer = session.answer("What did Alice say?").await.unwrap();
        assert!(answer.contains("Alice said hello."));
    }

    #[tokio::test]
    async fn test_load_unavailable() {
        let outcome = loader(None)
            .load("dQw4w9WgXcQ", Language::HindiAuto)
            .await
            .unwrap();

        assert!(matches!(outcome, LoadOutcome::Unavailable));
        let err = outcome.into_session("dQw4w9WgXcQ").err().unwrap();
        assert!(matches!(err, TubechatError::TranscriptUnavailable(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_garbage_input() {
        let err = loader(Some("text"))
            .load("not a video", Language::English)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TubechatError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let mut file = tempfile::Builder::new().suffix(".srt").tempfile().unwrap();
        write!(
            file,
            "1\n00:00:01,000 --> 00:00:02,000\nLocal captions work.\n\n2\n00:00:02,000 --> 00:00:03,000\nSecond cue.\n"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let session = loader(None)
            .load(&path, Language::English)
            .await
            .unwrap()
            .into_session(&path)
            .unwrap();

        let results = session.retrieve("captions").await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].chunk.text.contains("Local captions work."));
        assert!(!results[0].chunk.text.contains("-->"));
    }

    #[tokio::test]
    async fn test_reload_returns_independent_session() {
        let first = loader(Some("The first video is about cats."))
            .load("dQw4w9WgXcQ", Language::English)
            .await
            .unwrap()
            .into_session("dQw4w9WgXcQ")
            .unwrap();
        let second = loader(Some("The second video is about dogs."))
            .load("https://www.youtube.com/watch?v=9bZkp7q19f0", Language::English)
            .await
            .unwrap()
            .into_session("9bZkp7q19f0")
            .unwrap();

        let a = first.retrieve("animals").await.unwrap();
        let b = second.retrieve("animals").await.unwrap();
        assert!(a[0].chunk.text.contains("cats"));
        assert!(b[0].chunk.text.contains("dogs"));
        assert_eq!(second.video_id(), "9bZkp7q19f0");
    }
}
