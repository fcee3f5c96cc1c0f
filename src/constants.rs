//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants (e.g. byte sizes) from primary ones to avoid drift.
//!
//! # Model Coupling
//!
//! [`INTENT_MARGIN`] and the prototype sentences in [`crate::scoring`] were tuned against
//! `sentence-transformers/all-MiniLM-L6-v2`. Swapping the embedding model changes the score
//! distribution, so the margin has to be re-tuned alongside it.

/// Output dimension of all-MiniLM-L6-v2.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Sentence-transformers truncates MiniLM inputs at 256 word pieces.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Added to the L2 norm before dividing so zero vectors stay finite.
pub const NORM_EPSILON: f32 = 1e-12;

/// Maximum prototype score gap that still counts as an ambiguous ("both") intent.
pub const INTENT_MARGIN: f32 = 0.05;

pub const DEFAULT_TOP_K: usize = 10;

/// Lower bound on the candidate pool fetched before re-ranking.
pub const MIN_CANDIDATE_POOL: usize = 20;

/// Minimum entries per category guaranteed when intent is ambiguous.
pub const DEFAULT_MIN_EACH_IF_BOTH: usize = 3;

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Number of candidates fetched for a final list of `top_k`.
#[inline]
pub fn candidate_pool_size(top_k: usize) -> usize {
    MIN_CANDIDATE_POOL.max(top_k.saturating_mul(2))
}

/// Runtime dimension configuration for components that must agree on vector sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimConfig {
    /// The embedding vector dimension (number of floats).
    pub embedding_dim: usize,
}

impl Default for DimConfig {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl DimConfig {
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Rejects a zero dimension.
    pub fn validate(&self) -> Result<(), DimValidationError> {
        if self.embedding_dim == 0 {
            return Err(DimValidationError::ZeroDimension);
        }
        Ok(())
    }

    /// Returns the number of bytes needed for one F32 row.
    pub fn f32_bytes(&self) -> usize {
        self.embedding_dim * size_of::<f32>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimValidationError {
    #[error("embedding dimension cannot be zero")]
    ZeroDimension,

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: usize, actual: usize },
}

/// Checks that `actual` matches `expected`.
pub fn validate_embedding_dim(expected: usize, actual: usize) -> Result<(), DimValidationError> {
    if actual != expected {
        return Err(DimValidationError::Mismatch { expected, actual });
    }
    Ok(())
}
