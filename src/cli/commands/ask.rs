//! Ask command implementation.

use super::{load_session, run_preflight, with_model};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Loader;
use crate::transcript::Language;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    video: &str,
    question: &str,
    model: Option<String>,
    show_sources: bool,
    language: Language,
    settings: Settings,
) -> Result<()> {
    run_preflight(Operation::Ask, &settings, video)?;

    let loader = Loader::new(with_model(settings, model))?;
    let session = load_session(&loader, video, language).await?;

    let spinner = Output::spinner("Thinking...");
    let response = session.ask(question).await;
    spinner.finish_and_clear();

    match response {
        Ok(response) => {
            Output::answer(&response.answer);

            if show_sources && !response.sources.is_empty() {
                Output::header("Sources");
                for (i, source) in response.sources.iter().enumerate() {
                    Output::search_result(i + 1, source.chunk.order, source.score, &source.chunk.text);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
