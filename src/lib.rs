//! Assessment recommender library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`RetrievalEngine`], [`AssessmentRecord`] - Query to ranked, balanced recommendations
//! - [`Catalog`], [`CatalogRow`] - Assessment catalog store
//! - [`EmbeddingStore`] - Persisted catalog embeddings
//! - [`Config`], [`ConfigError`] - Service configuration
//!
//! ## Embedding & Scoring
//! - [`EmbeddingProvider`] - Text to vector seam
//! - [`SentenceEmbedder`], [`EmbedderConfig`] - all-MiniLM-L6-v2 (or stub) embeddings
//! - [`Intent`], [`PrototypeVectors`], [`balance`] - Intent inference and category balancing
//!
//! ## Vector Math
//! - [`EmbeddingMatrix`], [`Candidate`], [`top_n`], [`normalize`]
//!
//! ## Evaluation
//! - [`recall_at_k`], [`evaluate`], [`predict`] - Offline recall measurement
//!
//! ## Test/Mock Support
//! [`MockEmbedder`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod engine;
pub mod evaluation;
pub mod scoring;
pub mod storage;
pub mod vector;

pub use catalog::{Catalog, CatalogError, CatalogRow};
pub use config::{Config, ConfigError};
pub use constants::{DimConfig, DimValidationError, validate_embedding_dim};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{
    EmbedderConfig, EmbeddingError, EmbeddingProvider, SENTENCE_EMBEDDING_DIM,
    SENTENCE_MAX_SEQ_LEN, SentenceEmbedder,
};
pub use engine::{
    AssessmentRecord, EngineError, EngineResult, RetrievalEngine, Support, catalog_embeddings,
    validate_query,
};
pub use evaluation::{
    EvaluationError, EvaluationReport, LabeledQueries, LabeledQuery, Prediction, evaluate,
    predict, recall_at_k, write_predictions,
};
pub use scoring::{Intent, KNOWLEDGE_LABEL, PERSONALITY_LABEL, PrototypeVectors, balance};
pub use storage::{EmbeddingStore, EmbeddingStoreError};
pub use vector::{Candidate, EmbeddingMatrix, VectorError, cosine_similarity, normalize, top_n};
