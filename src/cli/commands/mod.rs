//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod search;
mod summarize;
mod transcript;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use search::run_search;
pub use summarize::run_summarize;
pub use transcript::run_transcript;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubechatError;
use crate::orchestrator::{LoadOutcome, Loader};
use crate::rag::RagSession;
use crate::transcript::Language;

/// Run pre-flight checks, printing a hint on failure.
fn run_preflight(operation: Operation, settings: &Settings, video: &str) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(operation, settings, video) {
        Output::error(&format!("{}", e));
        if matches!(e, TubechatError::ToolNotFound(_)) {
            Output::info("Install yt-dlp, or pass a local .txt/.srt/.vtt transcript instead.");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Load `video` behind a spinner, reporting why it failed if it did.
async fn load_session(
    loader: &Loader,
    video: &str,
    language: Language,
) -> crate::error::Result<RagSession> {
    let spinner = Output::spinner(&format!("Loading {} transcript...", language));
    let outcome = loader.load(video, language).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(LoadOutcome::Ready(session)) => {
            Output::success(&format!(
                "Indexed {} ({} chunks)",
                session.video_id(),
                session.chunk_count()
            ));
            Ok(session)
        }
        Ok(LoadOutcome::Unavailable) => {
            Output::warning(&format!(
                "No {} captions for {}. Captions may be disabled, or try another --lang.",
                language, video
            ));
            Err(TubechatError::TranscriptUnavailable(video.to_string()))
        }
        Err(e) if e.is_fetch_failure() => {
            Output::error(&format!("Could not fetch transcript: {}", e));
            Err(e)
        }
        Err(e) => {
            Output::error(&format!("Failed to load {}: {}", video, e));
            Err(e)
        }
    }
}

/// Apply a per-command model override.
fn with_model(mut settings: Settings, model: Option<String>) -> Settings {
    if let Some(model) = model {
        settings.generation.model = model;
    }
    settings
}
