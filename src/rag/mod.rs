//! RAG (Retrieval-Augmented Generation) question answering over one transcript.
//!
//! A [`RagSession`] binds a retriever to a generator for a single loaded video. Sessions
//! are immutable: loading another video produces a new session rather than changing this
//! one, so a session can be shared across tasks and queried concurrently.

pub mod context;
mod session;

pub use context::format_context_for_prompt;
pub use session::{RagResponse, RagSession};
