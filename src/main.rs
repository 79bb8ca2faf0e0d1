//! Tubechat CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubechat::cli::{commands, Cli, Commands};
use tubechat::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubechat={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let language = cli.lang.unwrap_or(settings.transcript.language);

    // Execute command
    match &cli.command {
        Commands::Ask {
            video,
            question,
            model,
            sources,
        } => {
            commands::run_ask(video, question, model.clone(), *sources, language, settings).await?;
        }

        Commands::Summarize { video, model } => {
            commands::run_summarize(video, model.clone(), language, settings).await?;
        }

        Commands::Chat { video, model } => {
            commands::run_chat(video.clone(), model.clone(), language, settings).await?;
        }

        Commands::Search { video, query, limit } => {
            commands::run_search(video, query, *limit, language, settings).await?;
        }

        Commands::Transcript { video, output } => {
            commands::run_transcript(video, output.clone(), language, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
