use thiserror::Error;

/// Errors returned by embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding is empty")]
    Empty,

    #[error("embedding component {index} is not finite")]
    NonFinite { index: usize },

    #[error("embedding has zero magnitude")]
    ZeroNorm,
}
