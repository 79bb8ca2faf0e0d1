//! Context formatting for RAG prompts.

use crate::vector_store::SearchResult;

/// Separator placed between retrieved chunks in the prompt.
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Join retrieved chunk texts, most similar first, separated by a blank line.
pub fn format_context_for_prompt(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}
