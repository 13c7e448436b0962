//! Vector index trait for storing and searching embedded fragments.

use async_trait::async_trait;

use crate::document::{FragmentPayload, SearchHit};
use crate::error::Result;

/// A similarity-searchable store of embedded fragments, keyed by named
/// collection.
///
/// Implementations manage `(vector, payload)` pairs and answer cosine
/// similarity queries gated by a hit threshold. Vectors live for the process
/// lifetime only; durability is out of scope.
///
/// # Example
///
/// ```rust,ignore
/// use clinrag::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new(0.60);
/// index.create_collection("docs", 1536).await?;
/// index.insert("docs", vectors, payloads).await?;
/// let hits = index.search("docs", &query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create a named collection for vectors of length `dimensions`.
    ///
    /// Idempotent: an existing collection with the same dimension is left
    /// untouched. An existing collection with a different dimension is a
    /// [`RagError::Configuration`](crate::RagError::Configuration) error.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Insert one [`IndexEntry`](crate::IndexEntry) per `(vector, payload)`
    /// pair, each with a freshly generated ID.
    ///
    /// `vectors` and `payloads` must have equal length; a mismatch is an
    /// [`RagError::ArityMismatch`](crate::RagError::ArityMismatch) error and
    /// nothing is inserted. Insertion order carries no meaning.
    async fn insert(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<FragmentPayload>,
    ) -> Result<()>;

    /// Return the `top_k` nearest entries by cosine similarity, ordered by
    /// descending score and filtered to `score > hit_threshold`.
    ///
    /// An empty result is `Ok` — a miss is not an error. `top_k` must be at
    /// least 1.
    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>>;

    /// Reconstruct the full text of one source document by concatenating its
    /// fragments in original sequence order.
    ///
    /// Returns `Ok(None)` when no fragment of that document is stored.
    async fn document_text(&self, collection: &str, document_name: &str)
    -> Result<Option<String>>;
}
