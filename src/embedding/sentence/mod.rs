//! Sentence embedder (all-MiniLM-L6-v2 via candle).
//!
//! Use [`EmbedderConfig::stub`] for tests/examples without model files.

/// Sentence embedder configuration.
pub mod config;


pub use config::{EmbedderConfig, MODEL_FILES, SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN};

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::{ComputeBackend, open_device};
use crate::embedding::error::EmbeddingError;
use crate::embedding::provider::EmbeddingProvider;
use crate::embedding::utils::{load_tokenizer_with_truncation, words};

enum EmbedderBackend {
    Model {
        encoder: BertEncoder,
        tokenizer: Arc<tokenizers::Tokenizer>,
        device: Device,
        backend: ComputeBackend,
    },
    Stub,
}

/// Embedding generator for catalog descriptions and queries (supports stub mode).
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: EmbedderConfig,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { backend, .. } => format!("Model({backend})"),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence embedder running in STUB mode (hashed bag-of-words)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        if let Some(path) = config.missing_model_file() {
            return Err(EmbeddingError::ModelNotFound { path });
        }

        let (device, backend) = open_device(config.device)?;

        let encoder = BertEncoder::load(&config.model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        if encoder.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim,
                    encoder.hidden_size()
                ),
            });
        }

        let tokenizer = load_tokenizer_with_truncation(&config.model_path, config.max_seq_len)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        info!(
            model_path = %config.model_path.display(),
            backend = %backend,
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                encoder,
                tokenizer: Arc::new(tokenizer),
                device,
                backend,
            },
            config,
        })
    }

    fn embed_with_model(
        &self,
        text: &str,
        encoder: &BertEncoder,
        tokenizer: &tokenizers::Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Encoding text"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let pooled = encoder
            .encode(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Transformer forward pass failed: {}", e),
            })?;

        let embedding = pooled.squeeze(0)?.to_vec1::<f32>()?;

        if embedding.len() != self.config.embedding_dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.embedding_dim,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    /// Feature-hashed term counts: each lowercase word adds ±1 to one bucket chosen by blake3.
    ///
    /// Texts sharing words get positive similarity, so the stub still ranks lexically.
    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let dim = self.config.embedding_dim;
        let mut embedding = vec![0.0f32; dim];

        for word in words(text) {
            let hash = blake3::hash(word.as_bytes());
            let bytes = hash.as_bytes();

            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % dim as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

            embedding[bucket] += sign;
        }

        embedding
    }

    /// Returns the configured output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    /// Backend the model runs on; `None` in stub mode.
    pub fn compute_backend(&self) -> Option<ComputeBackend> {
        match self.backend {
            EmbedderBackend::Model { backend, .. } => Some(backend),
            EmbedderBackend::Stub => None,
        }
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }
}

impl EmbeddingProvider for SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EmbedderBackend::Model {
                encoder,
                tokenizer,
                device,
                ..
            } => self.embed_with_model(text, encoder, tokenizer, device),
            EmbedderBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(batch = texts.len(), stub = self.is_stub(), "Embedding batch");

        // Sequential: mean pooling over a padded batch would need per-row masks anyway.
        let mut results = Vec::with_capacity(texts.len());
        for (idx, text) in texts.iter().enumerate() {
            results.push(self.embed(text)?);
            if (idx + 1) % 64 == 0 {
                debug!(done = idx + 1, total = texts.len(), "Embedding progress");
            }
        }
        Ok(results)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn is_stub(&self) -> bool {
        SentenceEmbedder::is_stub(self)
    }

    fn mode(&self) -> String {
        match self.compute_backend() {
            Some(backend) => format!("model:{backend}"),
            None => "stub".to_string(),
        }
    }
}
