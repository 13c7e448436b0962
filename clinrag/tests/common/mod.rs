//! Shared test doubles for the embedding and completion gateways.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use clinrag::{
    CompletionModel, DocumentMetadata, Embedder, Message, RagError, Result, SourceDocument,
};
use uuid::Uuid;

pub const DIM: usize = 4;

/// Deterministic embedder: returns the vector of the first rule whose key is
/// a substring of the input, falling back to the first basis vector.
pub struct MockEmbedder {
    rules: Vec<(String, Vec<f32>)>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_vector(mut self, key: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), DIM);
        self.rules.push((key.to_string(), vector));
        self
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        self.rules
            .iter()
            .find(|(key, _)| text.contains(key.as_str()))
            .map(|(_, vector)| vector.clone())
            .unwrap_or_else(|| vec![1.0, 0.0, 0.0, 0.0])
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "mock-embedder"
    }
}

/// Scripted completion model: records every call, fails when the first
/// message contains a configured marker, otherwise echoes a canned response.
pub struct MockModel {
    pub calls: Mutex<Vec<Vec<Message>>>,
    fail_markers: Vec<String>,
    response: String,
}

impl MockModel {
    pub fn new(response: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_markers: Vec::new(),
            response: response.to_string(),
        }
    }

    /// Fail any call whose leading system message contains `marker`.
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if let Some(first) = messages.first() {
            for marker in &self.fail_markers {
                if first.content.contains(marker.as_str()) {
                    return Err(RagError::Gateway {
                        gateway: "mock-model".to_string(),
                        message: format!("scripted failure on '{marker}'"),
                    });
                }
            }
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock-model"
    }
}

pub fn metadata(name: &str, title: Option<&str>) -> DocumentMetadata {
    DocumentMetadata {
        document_id: Uuid::new_v4(),
        document_name: name.to_string(),
        document_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        title: title.map(str::to_string),
        author: None,
        description: None,
        tags: Vec::new(),
    }
}

pub fn source_document(name: &str, title: Option<&str>, text: &str) -> SourceDocument {
    SourceDocument { name: name.to_string(), text: text.to_string(), metadata: metadata(name, title) }
}
