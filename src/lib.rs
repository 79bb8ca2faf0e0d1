//! Tubechat - chat with YouTube videos
//!
//! Answers natural-language questions about a single video using retrieval-augmented
//! generation over its captions.
//!
//! # Overview
//!
//! Tubechat allows you to:
//! - Fetch a YouTube video's captions (manual or auto-generated) or read a local transcript
//! - Split the transcript into overlapping chunks and index them in memory
//! - Ask questions and get answers grounded in the retrieved chunks
//! - Summarize a video or search it semantically
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `transcript` - Transcript sources (YouTube captions, local files)
//! - `chunking` - Overlapping text splitter
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory vector index and retriever
//! - `generation` - Answer generation
//! - `rag` - Question answering sessions
//! - `orchestrator` - Fetch, chunk and index into a session
//!
//! # Example
//!
//! ```rust,no_run
//! use tubechat::config::Settings;
//! use tubechat::orchestrator::Loader;
//! use tubechat::transcript::Language;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let loader = Loader::new(settings)?;
//!
//!     let session = loader
//!         .load("dQw4w9WgXcQ", Language::English)
//!         .await?
//!         .into_session("dQw4w9WgXcQ")?;
//!
//!     println!("{}", session.answer("What is this video about?").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, TubechatError};
