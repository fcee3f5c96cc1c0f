use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::EmbeddingError;
use super::provider::EmbeddingProvider;
use super::utils::words;

/// Table-driven embedding provider for tests.
///
/// Each vocabulary word owns one dimension, so similarity is exact term overlap with no hash
/// collisions. Exact-text overrides take precedence and let tests pin a vector for a given
/// string (e.g. a prototype sentence or a query).
#[derive(Debug, Clone, Default)]
pub struct MockEmbedder {
    dim: usize,
    vocabulary: HashMap<String, usize>,
    overrides: HashMap<String, Vec<f32>>,
    failing: bool,
    fail_texts: HashSet<String>,
    calls: Arc<AtomicUsize>,
}

impl MockEmbedder {
    /// Provider with `dim` dimensions and no vocabulary (unknown text embeds to zeros).
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            ..Default::default()
        }
    }

    /// One dimension per word, in the given order.
    pub fn with_vocabulary(vocabulary: &[&str]) -> Self {
        let vocabulary: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, word)| (word.to_lowercase(), idx))
            .collect();

        Self {
            dim: vocabulary.len(),
            vocabulary,
            ..Default::default()
        }
    }

    /// Pins the vector returned for exactly `text`.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        assert_eq!(
            vector.len(),
            self.dim,
            "override vector must have {} dimensions",
            self.dim
        );
        self.overrides.insert(text.into(), vector);
        self
    }

    /// Every call fails with [`EmbeddingError::InferenceFailed`].
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Only calls for exactly `text` fail.
    pub fn fail_on(mut self, text: impl Into<String>) -> Self {
        self.fail_texts.insert(text.into());
        self
    }

    /// Number of texts embedded so far (shared across clones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing || self.fail_texts.contains(text) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder configured to fail".to_string(),
            });
        }

        if let Some(vector) = self.overrides.get(text) {
            return Ok(vector.clone());
        }

        let mut embedding = vec![0.0f32; self.dim];
        for word in words(text) {
            if let Some(&idx) = self.vocabulary.get(&word) {
                embedding[idx] += 1.0;
            }
        }
        Ok(embedding)
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn is_stub(&self) -> bool {
        true
    }
}
