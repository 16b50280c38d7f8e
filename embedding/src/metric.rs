use crate::{Embedding, EmbeddingError};

/// Scores the similarity of two embeddings.
///
/// Implementations must be symmetric, bounded with a maximum of 1.0
/// for identical inputs, and higher must mean more similar.
///
/// Implementations must be safe for concurrent use.
pub trait Metric: Send + Sync {
    /// Returns the similarity score for `a` and `b`.
    fn similarity(&self, a: &Embedding, b: &Embedding) -> Result<f32, EmbeddingError>;
}

/// Cosine similarity, the default metric.
pub struct CosineMetric;

impl Metric for CosineMetric {
    fn similarity(&self, a: &Embedding, b: &Embedding) -> Result<f32, EmbeddingError> {
        cosine_similarity(a, b)
    }
}

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value in `[-1, 1]` where 1 means identical direction.
///
/// Uses f64 intermediate precision. Comparing embeddings of different
/// dimensionality is an error, never a silent zero score.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Result<f32, EmbeddingError> {
    if a.dim() != b.dim() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.dim(),
            got: b.dim(),
        });
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;

    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    // Norms are non-zero: Embedding construction rejects zero vectors.
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    // Clamp to [-1, 1] to handle floating point errors.
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}
