//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryIndex`] keeps collections in a `HashMap` behind a
//! `tokio::sync::RwLock`. Vectors live for the process lifetime only;
//! durability is out of scope.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::{FragmentPayload, IndexEntry, SearchHit};
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// One named collection with a fixed vector dimension.
#[derive(Debug, Default)]
struct Collection {
    dimensions: usize,
    entries: HashMap<Uuid, IndexEntry>,
}

/// An in-memory [`VectorIndex`] using cosine similarity with a score gate.
///
/// Every vector in a collection has the dimension fixed at collection
/// creation; inserts that violate it are rejected whole. Search results are
/// strictly filtered to `score > hit_threshold`.
#[derive(Debug)]
pub struct InMemoryIndex {
    hit_threshold: f32,
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryIndex {
    /// Create an empty index with the given hit threshold.
    pub fn new(hit_threshold: f32) -> Self {
        Self { hit_threshold, collections: RwLock::new(HashMap::new()) }
    }

    /// The minimum score a search result must exceed to be returned.
    pub fn hit_threshold(&self) -> f32 {
        self.hit_threshold
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new(crate::PipelineConfig::default().hit_threshold)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if dimensions == 0 {
            return Err(RagError::Configuration(format!(
                "collection '{name}' requires a positive vector dimension"
            )));
        }

        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.get(name) {
            if existing.dimensions != dimensions {
                return Err(RagError::Configuration(format!(
                    "collection '{name}' already exists with dimension {}, requested {dimensions}",
                    existing.dimensions
                )));
            }
            info!(collection = name, "collection already exists");
            return Ok(());
        }

        collections
            .insert(name.to_string(), Collection { dimensions, entries: HashMap::new() });
        info!(collection = name, dimensions, "collection created");
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<FragmentPayload>,
    ) -> Result<()> {
        if vectors.len() != payloads.len() {
            return Err(RagError::ArityMismatch {
                vectors: vectors.len(),
                payloads: payloads.len(),
            });
        }

        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| {
            RagError::InvalidArgument(format!("collection '{collection}' does not exist"))
        })?;

        // Validate the whole batch before touching the collection, so a bad
        // vector never leaves a partial insert behind.
        for vector in &vectors {
            if vector.len() != store.dimensions {
                return Err(RagError::Configuration(format!(
                    "vector of length {} does not match collection '{collection}' dimension {}",
                    vector.len(),
                    store.dimensions
                )));
            }
        }

        let count = vectors.len();
        for (vector, payload) in vectors.into_iter().zip(payloads) {
            let id = Uuid::new_v4();
            store.entries.insert(id, IndexEntry { id, vector, payload });
        }
        debug!(collection, count, "inserted entries");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(RagError::InvalidArgument("top_k must be at least 1".to_string()));
        }

        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| {
            RagError::InvalidArgument(format!("collection '{collection}' does not exist"))
        })?;

        let mut scored: Vec<(f32, &IndexEntry)> = store
            .entries
            .values()
            .map(|entry| (cosine_similarity(&entry.vector, query_vector), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .filter(|(score, _)| *score > self.hit_threshold)
            .map(|(score, entry)| SearchHit { score, metadata: entry.payload.metadata.clone() })
            .collect();

        debug!(collection, hit_count = hits.len(), "search completed");
        Ok(hits)
    }

    async fn document_text(
        &self,
        collection: &str,
        document_name: &str,
    ) -> Result<Option<String>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| {
            RagError::InvalidArgument(format!("collection '{collection}' does not exist"))
        })?;

        let mut fragments: Vec<(usize, &str)> = store
            .entries
            .values()
            .filter(|entry| entry.payload.metadata.document_name == document_name)
            .map(|entry| (entry.payload.sequence, entry.payload.text.as_str()))
            .collect();
        if fragments.is_empty() {
            return Ok(None);
        }

        fragments.sort_by_key(|(sequence, _)| *sequence);
        let text: String = fragments.into_iter().map(|(_, text)| text).collect();
        Ok(Some(text))
    }
}
