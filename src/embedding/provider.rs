use super::error::EmbeddingError;

/// Text → fixed-length vector contract the engine is written against.
///
/// Implementations must be deterministic, return vectors of exactly [`embedding_dim`]
/// values for any UTF-8 input (including the empty string), and be safe to call from
/// several threads at once. Output does not need to be normalized.
///
/// [`embedding_dim`]: EmbeddingProvider::embedding_dim
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds `texts` in order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Length of every returned vector.
    fn embedding_dim(&self) -> usize;

    /// `true` when vectors come from a deterministic stand-in rather than a model.
    fn is_stub(&self) -> bool {
        false
    }

    /// Short label for status reporting, e.g. `"stub"` or `"model:cuda"`.
    fn mode(&self) -> String {
        let mode = if self.is_stub() { "stub" } else { "model" };
        mode.to_string()
    }
}
