//! # clinrag
//!
//! Retrieval-augmented generation engine for clinical PDF literature.
//!
//! The crate ingests a directory of PDF documents into a similarity-searchable
//! vector index, then answers natural-language questions by retrieving
//! relevant document context, falling back to unguided generation on a miss,
//! optionally iterating a bounded number of refinement rounds, and
//! post-processing the answer into a fixed ten-section layout.
//!
//! ## Architecture
//!
//! - [`VectorIndex`] / [`InMemoryIndex`] — named collections of embedded
//!   fragments with cosine similarity search gated by a hit threshold
//! - [`Chunker`] / [`ParagraphChunker`] and [`ingest`] — PDF text extraction,
//!   metadata, and fragment production
//! - [`Embedder`] and [`CompletionModel`] — external gateway traits, with
//!   OpenAI-backed implementations in [`openai`]
//! - [`Pipeline`] — ingestion and retrieval orchestration
//! - [`Orchestrator`] — the [`RefinementLoop`] and [`SinglePass`] control
//!   policies
//! - [`ResponseFormatter`] — the fixed-section answer layout
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clinrag::{
//!     InMemoryIndex, ModelBackend, ParagraphChunker, Pipeline, PipelineConfig, Strategy,
//!     openai::OpenAiEmbedder,
//! };
//!
//! let config = PipelineConfig::default();
//! let pipeline = Arc::new(
//!     Pipeline::builder()
//!         .config(config.clone())
//!         .embedder(Arc::new(OpenAiEmbedder::from_env()?))
//!         .model(ModelBackend::OpenAi.connect(&api_key)?)
//!         .index(Arc::new(InMemoryIndex::new(config.hit_threshold)))
//!         .chunker(Arc::new(ParagraphChunker::new(config.chunk_size, config.chunk_overlap)))
//!         .build()?,
//! );
//!
//! pipeline.create_collection("library").await?;
//! pipeline.ingest_directory("library", Path::new("data/pdfs")).await?;
//!
//! let orchestrator = Strategy::SinglePass.orchestrator(pipeline);
//! let answer = orchestrator.answer("library", "What helps chronic tennis elbow?").await?;
//! println!("{}", answer.final_response);
//! ```

pub mod chunking;
pub mod completion;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod format;
pub mod index;
pub mod ingest;
pub mod inmemory;
pub mod openai;
pub mod pipeline;
pub mod prompts;
pub mod refine;
pub mod retry;

pub use chunking::{Chunker, ParagraphChunker};
pub use completion::{CompletionModel, ModelBackend};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{
    DocumentMetadata, FragmentPayload, IndexEntry, Message, QueryState, Role, SearchHit,
    SourceDocument,
};
pub use embedding::Embedder;
pub use error::{RagError, Result};
pub use format::{NO_INFORMATION, ResponseFormatter, SECTIONS};
pub use index::VectorIndex;
pub use inmemory::InMemoryIndex;
pub use pipeline::{IngestReport, NO_DOCUMENT_FOUND, Pipeline, PipelineBuilder, RetrievedContext};
pub use refine::{Orchestrator, RefinementLoop, SinglePass, Strategy};
pub use retry::GatewayPolicy;
