//! Embedding vectors and cosine similarity
//!
//! Every similarity score in reelx goes through [`cosine_similarity`].
//! Degenerate inputs (empty, mismatched lengths, zero magnitude) are
//! reported as errors instead of producing NaN; callers that always need a
//! number use [`cosine_similarity_or_zero`], which maps every error to `0.0`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A dense embedding vector
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Euclidean norm
    #[inline]
    pub fn magnitude(&self) -> f32 {
        magnitude(&self.data) as f32
    }

    /// Compute cosine similarity with another vector
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> Result<f32> {
        cosine_similarity(&self.data, &other.data)
    }

    /// Normalize the vector to unit length.
    /// Zero vectors are left untouched.
    #[inline]
    pub fn normalize(&mut self) {
        let norm = magnitude(&self.data);
        if norm > f64::from(f32::EPSILON) {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x = (f64::from(*x) * inv_norm) as f32;
            }
        }
    }

    /// Get normalized copy
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

/// Dot product accumulated in f64. Extra trailing elements of the longer
/// slice are ignored; [`cosine_similarity`] rejects mismatched lengths
/// before getting here.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

#[inline]
pub fn magnitude(a: &[f32]) -> f64 {
    a.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`
///
/// # Errors
/// * [`Error::EmptyVector`] if either input has no elements
/// * [`Error::InvalidDimension`] if the lengths differ
/// * [`Error::ZeroMagnitude`] if either input is the zero vector
///
/// # Returns
/// A score in [-1.0, 1.0]. Rounding can push identical vectors a hair past
/// 1.0, so the result is clamped.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        return Err(Error::EmptyVector);
    }
    if a.len() != b.len() {
        return Err(Error::InvalidDimension {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return Err(Error::ZeroMagnitude);
    }

    let score = dot_product(a, b) / (norm_a * norm_b);
    Ok(score.clamp(-1.0, 1.0) as f32)
}

/// Cosine similarity with `0.0` as the sentinel for degenerate input
///
/// Used by the similarity matrix and search explanations, where a pair that
/// cannot be compared still needs a score.
#[inline]
pub fn cosine_similarity_or_zero(a: &[f32], b: &[f32]) -> f32 {
    match cosine_similarity(a, b) {
        Ok(score) => score,
        Err(err) => {
            tracing::debug!("cosine similarity fell back to 0: {}", err);
            0.0
        }
    }
}
