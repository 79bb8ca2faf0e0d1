//! Transcript command implementation.

use super::run_preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Loader;
use crate::transcript::Language;
use anyhow::Result;

/// Run the transcript command.
pub async fn run_transcript(
    video: &str,
    output: Option<String>,
    language: Language,
    settings: Settings,
) -> Result<()> {
    run_preflight(Operation::Transcript, &settings, video)?;

    let loader = Loader::new(settings)?;

    let spinner = Output::spinner(&format!("Fetching {} transcript...", language));
    let fetched = loader.fetch_transcript(video, language).await;
    spinner.finish_and_clear();

    let text = match fetched {
        Ok(Some(text)) => text,
        Ok(None) => {
            Output::warning(&format!("No {} captions for {}.", language, video));
            return Err(anyhow::anyhow!("Transcript unavailable for {}", video));
        }
        Err(e) => {
            Output::error(&format!("Could not fetch transcript: {}", e));
            return Err(e.into());
        }
    };

    match output {
        Some(path) => {
            let path = Settings::expand_path(&path);
            std::fs::write(&path, &text)?;
            Output::success(&format!(
                "Wrote {} characters to {}",
                text.chars().count(),
                path.display()
            ));
        }
        None => println!("{}", text),
    }

    Ok(())
}
