//! Embedding provider contract and implementations.
//!
//! - [`EmbeddingProvider`] is the seam the engine depends on.
//! - [`sentence`] runs all-MiniLM-L6-v2 (or a stub) and is what the server uses.
//! - `MockEmbedder` (tests / `mock` feature) gives exact, hand-pinned vectors.

/// BERT encoder with mean pooling.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod provider;
/// Sentence embedder (catalog + query embeddings).
pub mod sentence;
/// Tokenizer loading helpers.
pub mod utils;

pub use device::{ComputeBackend, DevicePreference, open_device};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use provider::EmbeddingProvider;

pub use sentence::{EmbedderConfig, SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceEmbedder};
