use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Embedding width produced by the fashion encoder
pub const EMBEDDING_DIM: usize = 512;

/// A unit-length embedding vector
///
/// Normalization happens once at construction, so similarity is always a
/// plain dot product. Deserialization goes through the same validation, which
/// means stored vectors that were never normalized are fixed up on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding {
    data: Vec<f32>,
}

impl Embedding {
    /// Build an embedding from raw model output, L2-normalizing it
    pub fn new(data: Vec<f32>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidDimension { expected: EMBEDDING_DIM, actual: 0 });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(Error::InvalidInput("embedding contains non-finite values".to_string()));
        }

        let norm = crate::simd::norm(&data);
        if norm <= f32::EPSILON {
            return Err(Error::InvalidInput("embedding has zero length".to_string()));
        }

        let inv_norm = 1.0 / norm;
        let data = data.into_iter().map(|x| x * inv_norm).collect();
        Ok(Self { data })
    }

    /// Same as [`Embedding::new`] but also checks the dimension
    pub fn with_dim(data: Vec<f32>, expected: usize) -> Result<Self> {
        if data.len() != expected {
            return Err(Error::InvalidDimension { expected, actual: data.len() });
        }
        Self::new(data)
    }

    /// Average several embeddings and re-normalize the result
    pub fn mean(embeddings: &[&Embedding]) -> Result<Self> {
        let first = embeddings
            .first()
            .ok_or_else(|| Error::InvalidInput("cannot average zero embeddings".to_string()))?;
        let dim = first.dim();

        let mut sum = vec![0.0f32; dim];
        for embedding in embeddings {
            if embedding.dim() != dim {
                return Err(Error::InvalidDimension { expected: dim, actual: embedding.dim() });
            }
            for (acc, x) in sum.iter_mut().zip(embedding.as_slice()) {
                *acc += x;
            }
        }

        let count = embeddings.len() as f32;
        Self::new(sum.into_iter().map(|x| x / count).collect())
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Raw dot product (cosine similarity, since both sides are unit length)
    #[inline]
    pub fn dot(&self, other: &Embedding) -> f32 {
        crate::simd::dot_product(&self.data, &other.data)
    }

    /// Cosine similarity clamped to [0, 1]; mismatched dimensions score 0
    #[inline]
    pub fn similarity(&self, other: &Embedding) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }
        self.dot(other).clamp(0.0, 1.0)
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = Error;

    fn try_from(data: Vec<f32>) -> Result<Self> {
        Embedding::new(data)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.data
    }
}
