//! Thin command-line shell for the clinrag pipeline: `ingest` builds the
//! vector collection from a directory of PDFs, `query` answers one question
//! against it.
//!
//! Vectors live in process memory only, so `query` re-ingests the document
//! directory before answering.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clinrag::openai::OpenAiEmbedder;
use clinrag::{
    InMemoryIndex, ModelBackend, ParagraphChunker, Pipeline, PipelineConfig, Strategy,
};
use tracing::info;

const COLLECTION: &str = "clinical_documents";

#[derive(Parser)]
#[command(name = "clinrag", about = "Retrieval-augmented answers from clinical PDF literature")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Completion backend to use.
    #[arg(long, global = true, default_value = "openai")]
    backend: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a directory of PDF documents into the vector collection.
    Ingest {
        /// Directory containing the PDF files.
        #[arg(long, default_value = "data/pdfs")]
        dir: PathBuf,
    },
    /// Answer a question against an ingested document directory.
    Query {
        /// Directory containing the PDF files.
        #[arg(long, default_value = "data/pdfs")]
        dir: PathBuf,
        /// The question to answer.
        #[arg(long)]
        question: String,
        /// Orchestration strategy: 'refine' or 'single-pass'.
        #[arg(long, default_value = "single-pass")]
        strategy: String,
    },
}

async fn build_pipeline(backend: &str) -> Result<Arc<Pipeline>> {
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
    let backend = ModelBackend::parse(backend)?;
    let config = PipelineConfig::default();

    let pipeline = Pipeline::builder()
        .config(config.clone())
        .embedder(Arc::new(OpenAiEmbedder::new(&api_key)?))
        .model(backend.connect(&api_key)?)
        .index(Arc::new(InMemoryIndex::new(config.hit_threshold)))
        .chunker(Arc::new(ParagraphChunker::new(config.chunk_size, config.chunk_overlap)))
        .build()?;

    let pipeline = Arc::new(pipeline);
    pipeline.create_collection(COLLECTION).await?;
    Ok(pipeline)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let pipeline = build_pipeline(&cli.backend).await?;

    match cli.command {
        Commands::Ingest { dir } => {
            let report = pipeline.ingest_directory(COLLECTION, &dir).await?;
            println!(
                "Ingested {} documents ({} fragments), skipped {}",
                report.ingested, report.fragments, report.skipped
            );
        }
        Commands::Query { dir, question, strategy } => {
            let strategy = Strategy::parse(&strategy)?;
            let report = pipeline.ingest_directory(COLLECTION, &dir).await?;
            info!(ingested = report.ingested, skipped = report.skipped, "collection ready");

            let orchestrator = strategy.orchestrator(Arc::clone(&pipeline));
            let answer = orchestrator.answer(COLLECTION, &question).await?;
            println!("{}", answer.final_response);
        }
    }

    Ok(())
}
