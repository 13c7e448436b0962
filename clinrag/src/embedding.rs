//! Embedding gateway trait.

use async_trait::async_trait;

use crate::error::Result;

/// A gateway that maps text to fixed-length embedding vectors.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. `embed_batch` is order-preserving: one vector per input, in
/// input order. The default [`embed`](Embedder::embed) delegates to the
/// batch call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding vectors for a batch of texts, order-preserving.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors.pop().ok_or_else(|| crate::RagError::Gateway {
            gateway: self.name().to_string(),
            message: "gateway returned no embedding".to_string(),
        })
    }

    /// The dimensionality of vectors produced by this gateway.
    fn dimensions(&self) -> usize;

    /// A short gateway name for logging and errors.
    fn name(&self) -> &str;
}
