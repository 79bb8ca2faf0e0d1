//! Summarize command implementation.

use super::{load_session, run_preflight, with_model};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Loader;
use crate::transcript::Language;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(
    video: &str,
    model: Option<String>,
    language: Language,
    settings: Settings,
) -> Result<()> {
    run_preflight(Operation::Ask, &settings, video)?;

    let loader = Loader::new(with_model(settings, model))?;
    let session = load_session(&loader, video, language).await?;

    let spinner = Output::spinner("Summarizing...");
    let summary = session.summarize().await;
    spinner.finish_and_clear();

    match summary {
        Ok(text) => {
            Output::header("Summary");
            Output::answer(&text);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to summarize: {}", e));
            Err(e.into())
        }
    }
}
