//! Embedding generation: trait-based abstraction over text-to-vector
//! services, with an Ollama-backed implementation.

mod ollama;

pub use ollama::{OllamaConfig, OllamaEmbedder};

use crate::error::Result;

/// A text-to-vector service.
pub trait Embedder: Send + Sync {
    /// Generates an embedding for a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts. The result has one vector
    /// per input, in input order; any per-item failure aborts the batch
    /// with an error naming the failing index.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            let embedding = self.embed(text).map_err(|e| crate::error::Error::BatchItem {
                index,
                source: Box::new(e),
            })?;
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }

    /// Embedding vector length.
    fn dimensions(&self) -> usize;

    /// Model identifier.
    fn model(&self) -> &str;
}
