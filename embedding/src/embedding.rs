use serde::{Deserialize, Serialize};

use crate::EmbeddingError;

/// A dense f32 feature vector representing one face.
///
/// Construction validates the components, so every embedding held by
/// the registry can be scored by a [`crate::Metric`] without further
/// checks: no empty vectors, no NaN/infinite components, no all-zero
/// vectors (which have no direction to compare).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Validates and wraps a raw component vector.
    pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        for (index, v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(EmbeddingError::NonFinite { index });
            }
        }
        if values.iter().all(|v| *v == 0.0) {
            return Err(EmbeddingError::ZeroNorm);
        }
        Ok(Self(values))
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Raw component slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(e: Embedding) -> Self {
        e.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_vector() {
        let e = Embedding::new(vec![0.5, -0.2, 0.0]).unwrap();
        assert_eq!(e.dim(), 3);
        assert_eq!(e.as_slice(), &[0.5, -0.2, 0.0]);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            Embedding::new(vec![]),
            Err(EmbeddingError::Empty)
        ));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            Embedding::new(vec![1.0, f32::NAN]),
            Err(EmbeddingError::NonFinite { index: 1 })
        ));
        assert!(matches!(
            Embedding::new(vec![f32::INFINITY]),
            Err(EmbeddingError::NonFinite { index: 0 })
        ));
    }

    #[test]
    fn rejects_zero_norm() {
        assert!(matches!(
            Embedding::new(vec![0.0, 0.0, 0.0]),
            Err(EmbeddingError::ZeroNorm)
        ));
    }
}
