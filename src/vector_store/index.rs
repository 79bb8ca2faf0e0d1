//! Immutable in-memory vector index.

use super::{SearchResult, SimilarityMetric};
use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Chunks of one transcript together with their embeddings.
///
/// Construction is all-or-nothing: if any embedding fails, or comes back with the wrong
/// dimensionality, no index is produced.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
    metric: SimilarityMetric,
}

impl VectorIndex {
    /// Embed `chunks` in one batch and build an index over them.
    #[instrument(skip(chunks, embedder), fields(count = chunks.len()))]
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        metric: SimilarityMetric,
    ) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await.map_err(|e| match e {
            TubechatError::Embedding(_) => e,
            other => TubechatError::Embedding(other.to_string()),
        })?;

        let index = Self::from_embeddings(chunks, embeddings, embedder.dimensions(), metric)?;
        info!("Built index with {} entries ({} dims, {})", index.len(), index.dimensions, metric);
        Ok(index)
    }

    /// Build an index from precomputed embeddings, one per chunk.
    pub fn from_embeddings(
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
        dimensions: usize,
        metric: SimilarityMetric,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(TubechatError::Embedding(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        if let Some((chunk, embedding)) = chunks
            .iter()
            .zip(&embeddings)
            .find(|(_, e)| e.len() != dimensions)
        {
            return Err(TubechatError::Embedding(format!(
                "Chunk {} has {} dimensions, expected {}",
                chunk.order,
                embedding.len(),
                dimensions
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        Ok(Self {
            entries,
            dimensions,
            metric,
        })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_query(&self, query: &[f32]) -> Result<()> {
        if !self.is_empty() && query.len() != self.dimensions {
            return Err(TubechatError::VectorStore(format!(
                "Query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }
        Ok(())
    }

    /// Score every entry against `query`, best first, ties in document order.
    fn ranked(&self, query: &[f32]) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, self.metric.score(query, &entry.embedding)))
            .collect();

        scored.sort_by(|(ia, sa), (ib, sb)| {
            sb.total_cmp(sa)
                .then_with(|| self.entries[*ia].chunk.order.cmp(&self.entries[*ib].chunk.order))
        });
        scored
    }

    fn result(&self, i: usize, score: f32) -> SearchResult {
        SearchResult {
            chunk: self.entries[i].chunk.clone(),
            score,
        }
    }

    /// Return at most `k` chunks, most similar first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query, k, f32::NEG_INFINITY)
    }

    /// Search with a minimum similarity threshold.
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        self.check_query(query)?;

        let results: Vec<SearchResult> = self
            .ranked(query)
            .into_iter()
            .filter(|(_, score)| *score >= min_score)
            .take(k)
            .map(|(i, score)| self.result(i, score))
            .collect();

        debug!("Search returned {} of {} chunks", results.len(), self.len());
        Ok(results)
    }

    /// Maximal marginal relevance search.
    ///
    /// Takes the `fetch_k` most similar chunks, then greedily picks the candidate with the
    /// best `lambda * relevance - (1 - lambda) * redundancy`, where redundancy is the
    /// highest similarity to any chunk already picked. Results carry their relevance score
    /// and come back in pick order.
    pub fn search_mmr(
        &self,
        query: &[f32],
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
    ) -> Result<Vec<SearchResult>> {
        self.check_query(query)?;

        let mut candidates: Vec<(usize, f32)> =
            self.ranked(query).into_iter().take(fetch_k.max(k)).collect();
        let mut picked: Vec<(usize, f32)> = Vec::with_capacity(k);

        while picked.len() < k && !candidates.is_empty() {
            let mut best = 0;
            let mut best_score = f32::NEG_INFINITY;

            for (pos, (i, relevance)) in candidates.iter().enumerate() {
                let redundancy = picked
                    .iter()
                    .map(|(j, _)| {
                        self.metric
                            .score(&self.entries[*i].embedding, &self.entries[*j].embedding)
                    })
                    .fold(f32::NEG_INFINITY, f32::max);
                let redundancy = if picked.is_empty() { 0.0 } else { redundancy };

                let mmr = lambda_mult * relevance - (1.0 - lambda_mult) * redundancy;
                if mmr > best_score {
                    best = pos;
                    best_score = mmr;
                }
            }

            picked.push(candidates.remove(best));
        }

        Ok(picked
            .into_iter()
            .map(|(i, score)| self.result(i, score))
            .collect())
    }
}
