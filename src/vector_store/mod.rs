//! In-memory vector index and retrieval for one loaded transcript.
//!
//! The index is built once from a transcript's chunks and never mutated afterwards;
//! loading another video builds a new index.

mod index;
mod retriever;

pub use index::VectorIndex;
pub use retriever::Retriever;

use crate::chunking::Chunk;
use serde::{Deserialize, Serialize};

/// Similarity metric used to score chunks against a query. Higher scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Inner product; equals cosine for normalised vectors.
    Dot,
    /// Negated Euclidean distance.
    Euclidean,
}

impl SimilarityMetric {
    /// Score `b` against `a`. NaN results rank below everything else.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        let score = match self {
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::Dot => dot_product(a, b),
            SimilarityMetric::Euclidean => -euclidean_distance(a, b),
        };
        if score.is_nan() {
            f32::NEG_INFINITY
        } else {
            score
        }
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMetric::Cosine => write!(f, "cosine"),
            SimilarityMetric::Dot => write!(f, "dot"),
            SimilarityMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Retrieval strategy, fixed when the retriever is built.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SearchType {
    /// Plain top-k by similarity.
    #[default]
    Similarity,
    /// Top-k, dropping results that score below `min_score`.
    ScoreThreshold { min_score: f32 },
    /// Maximal marginal relevance over the best `fetch_k` candidates.
    Mmr { fetch_k: usize, lambda_mult: f32 },
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Similarity => write!(f, "similarity"),
            SearchType::ScoreThreshold { min_score } => {
                write!(f, "similarity_score_threshold (>= {:.2})", min_score)
            }
            SearchType::Mmr { fetch_k, lambda_mult } => {
                write!(f, "mmr (fetch_k {}, lambda {:.2})", fetch_k, lambda_mult)
            }
        }
    }
}

/// A retrieved chunk with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Inner product of two vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean distance between two vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_metric_scores() {
        let a = [3.0, 4.0];
        let b = [3.0, 0.0];
        assert!((SimilarityMetric::Dot.score(&a, &b) - 9.0).abs() < 1e-6);
        assert!((SimilarityMetric::Euclidean.score(&a, &b) + 4.0).abs() < 1e-6);
        assert!((SimilarityMetric::Cosine.score(&a, &b) - 0.6).abs() < 1e-6);
        assert_eq!(
            SimilarityMetric::Dot.score(&[f32::NAN], &[1.0]),
            f32::NEG_INFINITY
        );
    }
}
