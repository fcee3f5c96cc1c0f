use thiserror::Error;

use crate::catalog::CatalogError;
use crate::embedding::EmbeddingError;
use crate::storage::EmbeddingStoreError;
use crate::vector::VectorError;

#[derive(Debug, Error)]
/// Errors returned while building or querying the retrieval engine.
pub enum EngineError {
    /// Catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Embedding cache could not be read or written.
    #[error("embedding cache error: {0}")]
    Store(#[from] EmbeddingStoreError),

    /// Embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Provider output could not be stacked into a matrix.
    #[error("vector error: {0}")]
    Vector(#[from] VectorError),

    /// Cached embeddings do not line up with the catalog.
    #[error(
        "embedding cache has {cache_rows} rows but catalog has {catalog_rows}; \
         delete the cache or run prepare-embeddings --force"
    )]
    MisalignedCache {
        /// Rows in the cache file.
        cache_rows: usize,
        /// Rows in the catalog.
        catalog_rows: usize,
    },

    /// Vector width differs from the provider's declared dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Provider dimension.
        expected: usize,
        /// Observed dimension.
        actual: usize,
    },

    /// Caller passed an unusable argument.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },
}

impl EngineError {
    /// `true` for failures that come from files or settings rather than a single request.
    pub fn is_configuration(&self) -> bool {
        match self {
            EngineError::Catalog(_)
            | EngineError::Store(_)
            | EngineError::MisalignedCache { .. }
            | EngineError::DimensionMismatch { .. } => true,
            EngineError::Embedding(e) => matches!(
                e,
                EmbeddingError::ModelNotFound { .. }
                    | EmbeddingError::ModelLoadFailed { .. }
                    | EmbeddingError::DeviceUnavailable { .. }
                    | EmbeddingError::InvalidConfig { .. }
            ),
            EngineError::Vector(_) | EngineError::InvalidInput { .. } => false,
        }
    }
}

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
