//! Retrieval pipeline orchestrator.
//!
//! [`Pipeline`] composes an [`Embedder`], a [`CompletionModel`], a
//! [`VectorIndex`], and a [`Chunker`], and drives the two workflows of the
//! engine: batch ingestion (extract → chunk → embed → insert) and context
//! retrieval (embed → search → accept or miss → summarize).
//!
//! # Example
//!
//! ```rust,ignore
//! use clinrag::{Pipeline, PipelineConfig, InMemoryIndex, ParagraphChunker};
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .model(Arc::new(model))
//!     .index(Arc::new(InMemoryIndex::default()))
//!     .chunker(Arc::new(ParagraphChunker::default()))
//!     .build()?;
//!
//! pipeline.create_collection("library").await?;
//! pipeline.ingest_directory("library", Path::new("data/pdfs")).await?;
//! let context = pipeline.retrieve_context("library", "tennis elbow exercises").await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunking::Chunker;
use crate::completion::CompletionModel;
use crate::config::PipelineConfig;
use crate::document::{FragmentPayload, Message, SearchHit, SourceDocument};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::ingest;
use crate::prompts;
use crate::retry::{GatewayPolicy, call_gateway};

/// Sentinel result distinguishing "searched, found nothing" from "not yet
/// searched".
pub const NO_DOCUMENT_FOUND: &str = "NO DOCUMENT FOUND";

/// Outcome of one retrieval attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievedContext {
    /// The best hit cleared the threshold; carries the labeled summary of
    /// the full source document.
    Hit {
        /// Summary prefixed with `DOCUMENT_FILE_NAME` and `DOCUMENT_TITLE`
        /// labels for downstream citation.
        summary: String,
        /// The matched document's file name.
        document_name: String,
        /// The matched document's display title.
        title: String,
        /// The best hit's similarity score.
        score: f32,
    },
    /// No hit cleared the threshold.
    Miss,
}

impl RetrievedContext {
    /// The context text for display: the summary on a hit, the
    /// [`NO_DOCUMENT_FOUND`] sentinel on a miss.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Hit { summary, .. } => summary,
            Self::Miss => NO_DOCUMENT_FOUND,
        }
    }
}

/// Summary of one batch ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents successfully embedded and inserted.
    pub ingested: usize,
    /// Documents skipped because they could not be parsed.
    pub skipped: usize,
    /// Total fragments inserted across all documents.
    pub fragments: usize,
}

/// The retrieval pipeline. Construct via [`Pipeline::builder()`].
pub struct Pipeline {
    config: PipelineConfig,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn CompletionModel>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn Chunker>,
}

impl Pipeline {
    /// Create a new [`PipelineBuilder`].
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The completion gateway.
    pub fn model(&self) -> &Arc<dyn CompletionModel> {
        &self.model
    }

    /// The vector index.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// The gateway deadline/retry policy derived from configuration.
    pub fn gateway_policy(&self) -> GatewayPolicy {
        GatewayPolicy::from_config(&self.config)
    }

    /// Create a named collection sized to the embedder's dimensionality.
    pub async fn create_collection(&self, name: &str) -> Result<()> {
        self.index.create_collection(name, self.embedder.dimensions()).await
    }

    /// Ingest one parsed document: chunk → embed → insert.
    ///
    /// Returns the number of fragments inserted. An empty document inserts
    /// nothing and is not an error.
    pub async fn ingest_document(
        &self,
        collection: &str,
        document: &SourceDocument,
    ) -> Result<usize> {
        let fragments = self.chunker.chunk(&document.text);
        if fragments.is_empty() {
            info!(document = %document.name, fragment_count = 0, "ingested document (empty)");
            return Ok(0);
        }

        let texts: Vec<&str> = fragments.iter().map(String::as_str).collect();
        let vectors = call_gateway(self.embedder.name(), self.gateway_policy(), || {
            self.embedder.embed_batch(&texts)
        })
        .await?;

        let payloads: Vec<FragmentPayload> = fragments
            .iter()
            .enumerate()
            .map(|(sequence, text)| FragmentPayload {
                text: text.clone(),
                sequence,
                metadata: document.metadata.clone(),
            })
            .collect();

        let count = payloads.len();
        self.index.insert(collection, vectors, payloads).await?;
        info!(document = %document.name, fragment_count = count, "ingested document");
        Ok(count)
    }

    /// Ingest every PDF in a directory, isolating per-document failures.
    ///
    /// A document that fails to parse is logged and skipped; embedding and
    /// indexing continue for the rest of the batch. Gateway and index errors
    /// are not isolated — they abort the batch, since retrying the next
    /// document would hit the same failure.
    pub async fn ingest_directory(&self, collection: &str, dir: &Path) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        for file_name in ingest::list_pdf_files(dir)? {
            let document = match ingest::load_document(dir, &file_name) {
                Ok(document) => document,
                Err(e @ RagError::Parse { .. }) => {
                    warn!(document = %file_name, error = %e, "skipping unreadable document");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            report.fragments += self.ingest_document(collection, &document).await?;
            report.ingested += 1;
        }
        info!(
            collection,
            ingested = report.ingested,
            skipped = report.skipped,
            fragments = report.fragments,
            "batch ingest finished"
        );
        Ok(report)
    }

    /// Turn one user query into grounded context.
    ///
    /// Embeds the query, searches for the configured `top_k` candidates, and
    /// on an accepted hit reconstructs the full source document, summarizes
    /// it, and prefixes the `DOCUMENT_FILE_NAME` / `DOCUMENT_TITLE` labels.
    /// A miss yields [`RetrievedContext::Miss`], never an error.
    pub async fn retrieve_context(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<RetrievedContext> {
        let query_vector = call_gateway(self.embedder.name(), self.gateway_policy(), || {
            self.embedder.embed(query)
        })
        .await?;

        let hits = self.index.search(collection, &query_vector, self.config.top_k).await?;
        let Some(best) = hits.first() else {
            info!(collection, "no hit cleared the threshold");
            return Ok(RetrievedContext::Miss);
        };

        self.build_hit_context(collection, best).await
    }

    /// Fetch, summarize, and label the full document behind an accepted hit.
    async fn build_hit_context(
        &self,
        collection: &str,
        best: &SearchHit,
    ) -> Result<RetrievedContext> {
        let document_name = best.metadata.document_name.clone();
        let title = best.metadata.title_or_default().to_string();

        let Some(full_text) = self.index.document_text(collection, &document_name).await? else {
            // A hit whose fragments vanished should not fail the query.
            warn!(document = %document_name, "hit document has no stored fragments");
            return Ok(RetrievedContext::Miss);
        };

        let messages =
            vec![Message::system(prompts::SUMMARIZE_SYSTEM), Message::system(full_text)];
        let summary = call_gateway(self.model.name(), self.gateway_policy(), || {
            self.model.complete(&messages)
        })
        .await?;

        let summary = format!(
            "DOCUMENT_FILE_NAME: {document_name}: DOCUMENT_TITLE: {title}: {summary}"
        );
        info!(document = %document_name, score = best.score, "retrieval hit accepted");

        Ok(RetrievedContext::Hit { summary, document_name, title, score: best.score })
    }
}

/// Builder for constructing a [`Pipeline`]. All fields are required.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    model: Option<Arc<dyn CompletionModel>>,
    index: Option<Arc<dyn VectorIndex>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding gateway.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the completion gateway.
    pub fn model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the vector index.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`Pipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if any required field is missing.
    pub fn build(self) -> Result<Pipeline> {
        let config = self
            .config
            .ok_or_else(|| RagError::Configuration("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Configuration("embedder is required".to_string()))?;
        let model =
            self.model.ok_or_else(|| RagError::Configuration("model is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::Configuration("index is required".to_string()))?;
        let chunker = self
            .chunker
            .ok_or_else(|| RagError::Configuration("chunker is required".to_string()))?;

        Ok(Pipeline { config, embedder, model, index, chunker })
    }
}
