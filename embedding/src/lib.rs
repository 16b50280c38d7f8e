//! Face embedding vectors and similarity metrics.
//!
//! An [`Embedding`] is a fixed-length dense f32 vector produced by an
//! external face recognition model. The dimensionality is decided by
//! that model and stays constant for the process lifetime; this crate
//! only validates and compares the vectors it is handed.
//!
//! [`Metric`] scores how similar two embeddings are. [`CosineMetric`]
//! is the default implementation used throughout the registry.

mod embedding;
mod error;
mod metric;

pub use embedding::Embedding;
pub use error::EmbeddingError;
pub use metric::{CosineMetric, Metric, cosine_similarity};
