//! Integration tests for ingestion and retrieval orchestration.

mod common;

use std::sync::Arc;

use clinrag::{
    InMemoryIndex, Orchestrator, ParagraphChunker, Pipeline, PipelineConfig, RetrievedContext,
    Role, SinglePass, VectorIndex,
};
use common::{MockEmbedder, MockModel, source_document};

fn test_config() -> PipelineConfig {
    PipelineConfig::builder().gateway_retries(0).build().unwrap()
}

fn build_pipeline(embedder: MockEmbedder, model: Arc<MockModel>) -> Arc<Pipeline> {
    let config = test_config();
    Arc::new(
        Pipeline::builder()
            .config(config.clone())
            .embedder(Arc::new(embedder))
            .model(model)
            .index(Arc::new(InMemoryIndex::new(config.hit_threshold)))
            .chunker(Arc::new(ParagraphChunker::new(config.chunk_size, config.chunk_overlap)))
            .build()
            .unwrap(),
    )
}

#[tokio::test]
async fn empty_collection_query_is_a_miss_with_fallback_generation() {
    let model = Arc::new(MockModel::new("fallback answer"));
    let pipeline = build_pipeline(MockEmbedder::new(), Arc::clone(&model));
    pipeline.create_collection("docs").await.unwrap();

    let context = pipeline.retrieve_context("docs", "any question").await.unwrap();
    assert_eq!(context, RetrievedContext::Miss);
    assert_eq!(context.as_text(), "NO DOCUMENT FOUND");

    // The single-pass orchestrator must still answer via the bare query.
    let orchestrator = SinglePass::new(Arc::clone(&pipeline));
    let answer = orchestrator.answer("docs", "any question").await.unwrap();
    assert!(!answer.final_response.is_empty());

    // No call may carry injected document context.
    let calls = model.calls.lock().unwrap();
    for call in calls.iter() {
        assert!(
            !call.iter().any(|m| m.content.contains("Summary of relevant document")),
            "miss path must not inject document context"
        );
    }
}

#[tokio::test]
async fn accepted_hit_is_summarized_labeled_and_injected() {
    // Fragment embeds to the first basis vector; the query is built to score
    // exactly 0.75 against it, above the 0.60 threshold.
    let embedder = MockEmbedder::new()
        .with_vector("splint protocols", vec![0.75, 0.661_437_7, 0.0, 0.0]);
    let model = Arc::new(MockModel::new("summary of the splint document"));
    let pipeline = build_pipeline(embedder, Arc::clone(&model));
    pipeline.create_collection("docs").await.unwrap();

    let document = source_document(
        "thumb_splints.pdf",
        Some("Thumb Splint Outcomes"),
        "Custom thumb splints improved function in pediatric patients.",
    );
    pipeline.ingest_document("docs", &document).await.unwrap();

    let context =
        pipeline.retrieve_context("docs", "evidence on splint protocols").await.unwrap();
    let RetrievedContext::Hit { summary, document_name, title, score } = context else {
        panic!("expected a hit");
    };
    assert_eq!(document_name, "thumb_splints.pdf");
    assert_eq!(title, "Thumb Splint Outcomes");
    assert!((score - 0.75).abs() < 1e-5);
    assert!(summary.starts_with("DOCUMENT_FILE_NAME: thumb_splints.pdf:"));
    assert!(summary.contains("DOCUMENT_TITLE: Thumb Splint Outcomes:"));
    assert!(summary.contains("summary of the splint document"));

    // The summarization call received the reconstructed full document text.
    let calls = model.calls.lock().unwrap();
    let summarize_call = &calls[0];
    assert!(summarize_call.iter().any(|m| m.content.contains("Custom thumb splints")));
    drop(calls);

    // The single-pass orchestrator injects the labeled summary as a system
    // message ahead of the user's query.
    let orchestrator = SinglePass::new(Arc::clone(&pipeline));
    orchestrator.answer("docs", "evidence on splint protocols").await.unwrap();

    let calls = model.calls.lock().unwrap();
    let generation_call = calls
        .iter()
        .find(|call| call.iter().any(|m| m.content.contains("Summary of relevant document")))
        .expect("generation call with injected context");
    let context_pos = generation_call
        .iter()
        .position(|m| m.role == Role::System && m.content.contains("DOCUMENT_FILE_NAME"))
        .unwrap();
    let query_pos = generation_call
        .iter()
        .position(|m| m.role == Role::User && m.content.contains("splint protocols"))
        .unwrap();
    assert!(context_pos < query_pos, "context must precede the user query");
}

#[tokio::test]
async fn missing_title_falls_back_to_sentinel_in_labels() {
    let embedder = MockEmbedder::new().with_vector("query", vec![0.9, 0.1, 0.0, 0.0]);
    let model = Arc::new(MockModel::new("summary"));
    let pipeline = build_pipeline(embedder, Arc::clone(&model));
    pipeline.create_collection("docs").await.unwrap();

    let document = source_document("untitled.pdf", None, "Some clinical text.");
    pipeline.ingest_document("docs", &document).await.unwrap();

    let context = pipeline.retrieve_context("docs", "query").await.unwrap();
    let RetrievedContext::Hit { summary, title, .. } = context else { panic!("expected a hit") };
    assert_eq!(title, "No title found");
    assert!(summary.contains("DOCUMENT_TITLE: No title found:"));
}

#[tokio::test]
async fn ingest_then_reconstruct_round_trips_fragment_concatenation() {
    let model = Arc::new(MockModel::new("unused"));
    let config = test_config();
    let index = Arc::new(InMemoryIndex::new(config.hit_threshold));
    let chunker = ParagraphChunker::new(40, 10);
    let pipeline = Pipeline::builder()
        .config(config)
        .embedder(Arc::new(MockEmbedder::new()))
        .model(model)
        .index(Arc::clone(&index) as Arc<dyn VectorIndex>)
        .chunker(Arc::new(chunker.clone()))
        .build()
        .unwrap();
    pipeline.create_collection("docs").await.unwrap();

    let text = "First paragraph of findings.\n\nSecond paragraph with more detail.\n\nThird.";
    let document = source_document("study.pdf", Some("Study"), text);
    let count = pipeline.ingest_document("docs", &document).await.unwrap();
    assert!(count > 1, "text should split into multiple fragments");

    use clinrag::Chunker;
    let expected: String = chunker.chunk(text).concat();
    let reconstructed = index.document_text("docs", "study.pdf").await.unwrap().unwrap();
    assert_eq!(reconstructed, expected);
}

#[tokio::test]
async fn empty_document_ingests_zero_fragments() {
    let model = Arc::new(MockModel::new("unused"));
    let pipeline = build_pipeline(MockEmbedder::new(), model);
    pipeline.create_collection("docs").await.unwrap();

    let document = source_document("blank.pdf", None, "");
    let count = pipeline.ingest_document("docs", &document).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn batch_ingest_skips_unreadable_documents_and_continues() {
    let model = Arc::new(MockModel::new("unused"));
    let pipeline = build_pipeline(MockEmbedder::new(), model);
    pipeline.create_collection("docs").await.unwrap();

    // A directory with only broken "PDFs": every document fails to parse but
    // the batch itself succeeds with a skip count.
    let dir = std::env::temp_dir().join("clinrag_batch_test");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("broken_a.pdf"), b"not a pdf").unwrap();
    std::fs::write(dir.join("broken_b.pdf"), b"also not a pdf").unwrap();

    let report = pipeline.ingest_directory("docs", &dir).await.unwrap();
    assert_eq!(report.ingested, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.fragments, 0);

    std::fs::remove_dir_all(&dir).ok();
}
