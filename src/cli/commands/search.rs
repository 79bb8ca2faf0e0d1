//! Search command implementation.

use super::{load_session, run_preflight};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Loader;
use crate::transcript::Language;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    video: &str,
    query: &str,
    limit: Option<usize>,
    language: Language,
    mut settings: Settings,
) -> Result<()> {
    run_preflight(Operation::Search, &settings, video)?;

    if let Some(limit) = limit {
        settings.retrieval.k = limit.max(1);
    }

    let loader = Loader::new(settings)?;
    let session = load_session(&loader, video, language).await?;

    let spinner = Output::spinner("Searching...");
    let results = session.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!(
                    "Found {} results ({})",
                    results.len(),
                    session.retriever().search_type()
                ));

                for (i, result) in results.iter().enumerate() {
                    Output::search_result(i + 1, result.chunk.order, result.score, &result.chunk.text);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
