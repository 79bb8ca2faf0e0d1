//! Question answering over a single loaded transcript.

use super::context::format_context_for_prompt;
use crate::config::Prompts;
use crate::error::{Result, TubechatError};
use crate::generation::Generator;
use crate::vector_store::{Retriever, SearchResult};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Response from a RAG query.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer, exactly as returned by the model.
    pub answer: String,
    /// Retrieved chunks, most similar first.
    pub sources: Vec<SearchResult>,
}

/// A ready-to-query transcript: retriever, generator and prompt templates.
#[derive(Clone)]
pub struct RagSession {
    video_id: String,
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    prompts: Arc<Prompts>,
}

impl RagSession {
    /// Create a session with the built-in prompt templates.
    pub fn new(video_id: &str, retriever: Retriever, generator: Arc<dyn Generator>) -> Self {
        Self {
            video_id: video_id.to_string(),
            retriever,
            generator,
            prompts: Arc::new(Prompts::default()),
        }
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Number of indexed chunks.
    pub fn chunk_count(&self) -> usize {
        self.retriever.index().len()
    }

    /// Retrieve the chunks most relevant to `query` without generating.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.retriever.retrieve(query).await
    }

    /// Render the answer prompt for `question` over `sources`.
    pub fn build_prompt(&self, sources: &[SearchResult], question: &str) -> String {
        let context = format_context_for_prompt(sources);
        self.prompts.render_answer(&context, question)
    }

    /// Answer `question` and return the chunks the answer was grounded on.
    #[instrument(skip(self, question), fields(video_id = %self.video_id))]
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let sources = self.retrieve(question).await?;
        let prompt = self.build_prompt(&sources, question);

        let answer = self.generator.generate(&prompt).await.map_err(|e| match e {
            TubechatError::Generation(_) => e,
            other => TubechatError::Generation(other.to_string()),
        })?;

        debug!("Generated response with {} sources", sources.len());

        Ok(RagResponse { answer, sources })
    }

    /// Answer `question` from the transcript.
    pub async fn answer(&self, question: &str) -> Result<String> {
        Ok(self.ask(question).await?.answer)
    }

    /// Summarize the video.
    ///
    /// Context is retrieved against the fixed summary instruction, so only the top `k`
    /// chunks reach the model.
    pub async fn summarize(&self) -> Result<String> {
        let instruction = self.prompts.rag.summary.clone();
        self.answer(&instruction).await
    }
}
