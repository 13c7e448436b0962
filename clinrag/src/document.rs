//! Data types for documents, index entries, search hits, and conversations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display fallback when a document carries no title.
pub const NO_TITLE: &str = "No title found";
/// Display fallback when a document carries no author.
pub const NO_AUTHOR: &str = "Anonymous";
/// Display fallback when a document carries no description.
pub const NO_DESCRIPTION: &str = "No description provided";

/// Metadata describing one ingested source document.
///
/// Created once at ingestion time and never mutated afterwards. Optional
/// fields stay `None` when the source metadata is absent; the `*_or_default`
/// accessors supply the display fallback so placeholder strings are never
/// stored in the index itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    /// Unique identifier, generated at ingestion.
    pub document_id: Uuid,
    /// The source file name; the stable external identifier for the document.
    pub document_name: String,
    /// The date the document was ingested.
    pub document_date: NaiveDate,
    /// Title from the source metadata, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author from the source metadata, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Subject or description from the source metadata, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Categorization tags, in source order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DocumentMetadata {
    /// The title, or [`NO_TITLE`] when the source had none.
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(NO_TITLE)
    }

    /// The author, or [`NO_AUTHOR`] when the source had none.
    pub fn author_or_default(&self) -> &str {
        self.author.as_deref().unwrap_or(NO_AUTHOR)
    }

    /// The description, or [`NO_DESCRIPTION`] when the source had none.
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

/// Per-fragment data stored alongside each vector.
///
/// `sequence` records the fragment's position within its source document so
/// the full text can be reconstructed in original order later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FragmentPayload {
    /// The fragment's text content.
    pub text: String,
    /// Zero-based position of this fragment within its source document.
    pub sequence: usize,
    /// Metadata of the source document, shared by all its fragments.
    pub metadata: DocumentMetadata,
}

/// One stored (vector, payload) pair in a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// Unique entry identifier, generated at insert time.
    pub id: Uuid,
    /// The embedding vector. Same length as the collection dimension.
    pub vector: Vec<f32>,
    /// The fragment payload.
    pub payload: FragmentPayload,
}

/// A similarity-search result that cleared the hit threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Cosine similarity in `[-1, 1]`, strictly above the hit threshold.
    pub score: f32,
    /// Metadata of the matched fragment's source document.
    pub metadata: DocumentMetadata,
}

/// A parsed source document ready for chunking and embedding.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// The source file name.
    pub name: String,
    /// The full extracted text.
    pub text: String,
    /// Metadata extracted from the source.
    pub metadata: DocumentMetadata,
}

/// The speaker of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and injected context.
    System,
    /// The querying user.
    User,
    /// Model-generated content.
    Assistant,
}

/// One role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Message {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Per-query session record, built up across orchestration stages and
/// discarded once the final response is returned to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    /// The user's original question.
    pub user_query: String,
    /// The raw generated answer before formatting.
    pub research_response: String,
    /// The formatted ten-section answer.
    pub final_response: String,
}
