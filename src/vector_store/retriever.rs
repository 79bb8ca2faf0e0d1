//! Retrieval policy on top of a vector index.

use super::{SearchResult, SearchType, VectorIndex};
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default number of chunks returned per query.
pub const DEFAULT_K: usize = 4;

/// Embeds queries and searches an index with a fixed `k` and search type.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    k: usize,
    search_type: SearchType,
}

impl Retriever {
    /// Create a retriever with plain similarity search and `k = 4`.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            k: DEFAULT_K,
            search_type: SearchType::Similarity,
        }
    }

    /// Set the number of chunks returned per query.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the search type.
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn search_type(&self) -> SearchType {
        self.search_type
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Embed `query` and return the matching chunks, best first.
    #[instrument(skip(self, query))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await.map_err(|e| match e {
            TubechatError::Embedding(_) => e,
            other => TubechatError::Embedding(other.to_string()),
        })?;

        let results = match self.search_type {
            SearchType::Similarity => self.index.search(&query_embedding, self.k)?,
            SearchType::ScoreThreshold { min_score } => {
                self.index
                    .search_with_threshold(&query_embedding, self.k, min_score)?
            }
            SearchType::Mmr {
                fetch_k,
                lambda_mult,
            } => self
                .index
                .search_mmr(&query_embedding, self.k, fetch_k, lambda_mult)?,
        };

        debug!("Retrieved {} chunks ({})", results.len(), self.search_type);
        Ok(results)
    }
}
