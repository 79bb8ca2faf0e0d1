//! CLI module for Tubechat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::transcript::Language;
use clap::{Parser, Subcommand};

/// Tubechat - chat with YouTube videos
///
/// Fetches a video's captions, indexes them in memory and answers questions
/// grounded in what was actually said.
#[derive(Parser, Debug)]
#[command(name = "tubechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Caption language preference (en, hi, hi-auto, en-auto)
    #[arg(short, long, global = true, env = "TUBECHAT_LANG")]
    pub lang: Option<Language>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question about a video
    Ask {
        /// YouTube URL/ID, or local transcript file (.txt, .srt, .vtt)
        video: String,

        /// The question to ask
        question: String,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Print the transcript chunks the answer was grounded on
        #[arg(short, long)]
        sources: bool,
    },

    /// Summarize a video
    Summarize {
        /// YouTube URL/ID, or local transcript file
        video: String,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        /// Video to load on startup (use /load inside the session to switch)
        video: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show the transcript chunks most relevant to a query
    Search {
        /// YouTube URL/ID, or local transcript file
        video: String,

        /// Search query
        query: String,

        /// Maximum number of results (defaults to retrieval.k)
        #[arg(short = 'k', long)]
        limit: Option<usize>,
    },

    /// Print a video's transcript
    Transcript {
        /// YouTube URL/ID, or local transcript file
        video: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
