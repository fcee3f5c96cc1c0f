//! Retrieval engine: catalog + cached embeddings + prototypes, queried per request.
//!
//! # Pipeline
//!
//! ```text
//! query -> embed -> normalize -> top_n over catalog matrix -> intent -> balance -> records
//! ```
//!
//! The engine is immutable after [`RetrievalEngine::build`] and is shared across request
//! threads behind an `Arc`.

mod assembler;
mod error;

#[cfg(test)]
mod tests;

pub use assembler::{AssessmentRecord, Support};
pub use error::{EngineError, EngineResult};

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::constants::{DEFAULT_MIN_EACH_IF_BOTH, candidate_pool_size, validate_embedding_dim};
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::scoring::{Intent, PrototypeVectors, balance};
use crate::storage::EmbeddingStore;
use crate::vector::{Candidate, EmbeddingMatrix, normalize_in_place, top_n};

/// Returns the raw catalog embeddings, reading the cache or building and persisting it.
///
/// A cache that exists but disagrees with the catalog or provider is an error; it is never
/// rebuilt behind the caller's back.
pub fn catalog_embeddings<P: EmbeddingProvider + ?Sized>(
    catalog: &Catalog,
    provider: &P,
    store: &EmbeddingStore,
) -> EngineResult<EmbeddingMatrix> {
    let expected_dim = provider.embedding_dim();

    if let Some(matrix) = store.load()? {
        if matrix.rows() != catalog.len() {
            return Err(EngineError::MisalignedCache {
                cache_rows: matrix.rows(),
                catalog_rows: catalog.len(),
            });
        }
        validate_embedding_dim(expected_dim, matrix.dim()).map_err(|_| {
            EngineError::DimensionMismatch {
                expected: expected_dim,
                actual: matrix.dim(),
            }
        })?;
        return Ok(matrix);
    }

    info!(
        rows = catalog.len(),
        path = %store.path().display(),
        stub = provider.is_stub(),
        "Embedding catalog descriptions"
    );
    let started = Instant::now();

    let descriptions = catalog.descriptions();
    let vectors = provider.embed_batch(&descriptions)?;
    if vectors.len() != descriptions.len() {
        return Err(EmbeddingError::InferenceFailed {
            reason: format!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                descriptions.len()
            ),
        }
        .into());
    }

    let matrix = EmbeddingMatrix::from_rows(vectors, expected_dim)?;
    store.store(&matrix)?;

    info!(
        rows = matrix.rows(),
        dim = matrix.dim(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Catalog embeddings built"
    );

    Ok(matrix)
}

/// Trims `query`, rejecting it when nothing is left.
///
/// [`RetrievalEngine::recommend`] tolerates blank input on its own; request boundaries call
/// this first so a blank query is reported instead of answered with an empty list.
pub fn validate_query(query: &str) -> EngineResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(EngineError::InvalidInput {
            reason: "query must not be empty".to_string(),
        });
    }
    Ok(query)
}

/// Read-only recommender over one catalog.
pub struct RetrievalEngine<E: EmbeddingProvider> {
    catalog: Catalog,
    /// Row-normalized; row `i` belongs to catalog row `i`.
    matrix: EmbeddingMatrix,
    prototypes: PrototypeVectors,
    embedder: E,
}

impl<E: EmbeddingProvider> std::fmt::Debug for RetrievalEngine<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalEngine")
            .field("rows", &self.matrix.rows())
            .field("dim", &self.matrix.dim())
            .field("stub", &self.embedder.is_stub())
            .finish()
    }
}

impl<E: EmbeddingProvider> RetrievalEngine<E> {
    /// Loads (or builds) the catalog embeddings and embeds the intent prototypes.
    pub fn build(catalog: Catalog, embedder: E, store: &EmbeddingStore) -> EngineResult<Self> {
        if embedder.is_stub() {
            warn!("Embedding provider is a stub; recommendations are lexical, not semantic");
        }

        let mut matrix = catalog_embeddings(&catalog, &embedder, store)?;
        matrix.normalize_rows();

        let prototypes = PrototypeVectors::embed(&embedder)?;
        if prototypes.dim() != matrix.dim() {
            return Err(EngineError::DimensionMismatch {
                expected: matrix.dim(),
                actual: prototypes.dim(),
            });
        }

        info!(
            rows = catalog.len(),
            dim = matrix.dim(),
            stub = embedder.is_stub(),
            "Retrieval engine ready"
        );

        Ok(Self {
            catalog,
            matrix,
            prototypes,
            embedder,
        })
    }

    /// Loads the catalog file, then [`build`](Self::build)s against the cache at `embeddings_path`.
    pub fn from_paths(
        catalog_path: impl AsRef<Path>,
        embeddings_path: impl AsRef<Path>,
        embedder: E,
    ) -> EngineResult<Self> {
        let catalog = Catalog::load(catalog_path)?;
        let store = EmbeddingStore::new(embeddings_path.as_ref());
        Self::build(catalog, embedder, &store)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn prototypes(&self) -> &PrototypeVectors {
        &self.prototypes
    }

    /// Number of catalog rows.
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Embeds and normalizes a query.
    fn embed_query(&self, query: &str) -> EngineResult<Vec<f32>> {
        let mut vector = self.embedder.embed(query)?;
        validate_embedding_dim(self.matrix.dim(), vector.len()).map_err(|_| {
            EngineError::DimensionMismatch {
                expected: self.matrix.dim(),
                actual: vector.len(),
            }
        })?;
        normalize_in_place(&mut vector);
        Ok(vector)
    }

    fn search_vector(&self, query: &[f32], top: usize) -> Vec<Candidate> {
        top_n(&self.matrix.scores(query), top)
    }

    /// Top `top` catalog rows by cosine similarity, best first, ties in catalog order.
    ///
    /// Blank queries and empty catalogs return nothing without touching the provider.
    pub fn search(&self, query: &str, top: usize) -> EngineResult<Vec<Candidate>> {
        if query.trim().is_empty() || self.catalog.is_empty() || top == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embed_query(query)?;
        Ok(self.search_vector(&vector, top))
    }

    pub fn infer_intent(&self, query: &str) -> EngineResult<Intent> {
        let vector = self.embed_query(query)?;
        Ok(self.prototypes.classify(&vector))
    }

    /// Cuts `candidates` to `top_k`, mixing categories when the query's intent is ambiguous.
    pub fn rebalance(
        &self,
        query: &str,
        candidates: &[Candidate],
        top_k: usize,
        min_each: usize,
    ) -> EngineResult<Vec<Candidate>> {
        let intent = self.infer_intent(query)?;
        Ok(balance(intent, candidates, &self.catalog, top_k, min_each))
    }

    /// Response records for `candidates`, same order. Unknown indices are skipped.
    pub fn assemble(&self, candidates: &[Candidate]) -> Vec<AssessmentRecord> {
        candidates
            .iter()
            .filter_map(|c| self.catalog.get(c.index))
            .map(AssessmentRecord::from_row)
            .collect()
    }

    /// Full pipeline for one query. The query is embedded once and reused for intent.
    pub fn recommend(&self, query: &str, top_k: usize) -> EngineResult<Vec<AssessmentRecord>> {
        if query.trim().is_empty() || self.catalog.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embed_query(query)?;
        let candidates = self.search_vector(&vector, candidate_pool_size(top_k));
        let intent = self.prototypes.classify(&vector);
        let selected = balance(
            intent,
            &candidates,
            &self.catalog,
            top_k,
            DEFAULT_MIN_EACH_IF_BOTH,
        );

        debug!(
            query_len = query.len(),
            candidates = candidates.len(),
            returned = selected.len(),
            %intent,
            top_score = selected.first().map(|c| c.score),
            "Recommendation computed"
        );

        Ok(self.assemble(&selected))
    }
}
