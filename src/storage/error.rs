use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by the embedding cache file.
pub enum EmbeddingStoreError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the expected magic bytes.
    #[error("not an embedding cache file: {path}")]
    BadMagic {
        /// Offending file.
        path: PathBuf,
    },

    /// File is shorter or longer than its header claims.
    #[error("embedding cache {path} has {actual} bytes, header implies {expected}")]
    SizeMismatch {
        /// Offending file.
        path: PathBuf,
        /// Size implied by the header.
        expected: u64,
        /// Size on disk.
        actual: u64,
    },

    /// Header dimensions cannot be represented on this platform.
    #[error("embedding cache {path} header is invalid: {reason}")]
    InvalidHeader {
        /// Offending file.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },

    /// Storage path has no parent directory to stage the temp file in.
    #[error("storage path unavailable: {path}")]
    StorageUnavailable {
        /// Path that was unavailable.
        path: PathBuf,
    },
}

/// Convenience result type for embedding cache operations.
pub type StoreResult<T> = Result<T, EmbeddingStoreError>;
