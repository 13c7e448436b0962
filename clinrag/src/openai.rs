//! OpenAI-backed embedding and completion gateways.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::CompletionModel;
use crate::document::{Message, Role};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default embedding model and its dimensionality.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// The default chat model.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

fn gateway_error(message: impl Into<String>) -> RagError {
    RagError::Gateway { gateway: "OpenAI".to_string(), message: message.into() }
}

fn require_api_key(api_key: impl Into<String>) -> Result<String> {
    let api_key = api_key.into();
    if api_key.is_empty() {
        return Err(gateway_error("API key must not be empty"));
    }
    Ok(api_key)
}

/// Decode an OpenAI error body into its message, falling back to the raw body.
async fn response_error(response: reqwest::Response) -> RagError {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    error!(gateway = "OpenAI", %status, "API error");
    gateway_error(format!("API returned {status}: {detail}"))
}

/// An [`Embedder`] backed by the OpenAI embeddings API.
///
/// Calls `/v1/embeddings` directly over `reqwest`. Defaults to
/// `text-embedding-3-small` at 1536 dimensions.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Create a new embedder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: require_api_key(api_key)?,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Create a new embedder from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| gateway_error("OPENAI_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    /// Override the embedding model and its dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(gateway = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbeddingRequest { model: &self.model, input: texts.to_vec() };
        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| gateway_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| gateway_error(format!("failed to parse response: {e}")))?;

        if embedding_response.data.len() != texts.len() {
            return Err(gateway_error(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

/// A [`CompletionModel`] backed by the OpenAI chat completions API.
pub struct OpenAiCompletion {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiCompletion {
    /// Create a new completion gateway with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: require_api_key(api_key)?,
            model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    /// Create a new gateway from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| gateway_error("OPENAI_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    /// Override the chat model (e.g. `gpt-4o`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl CompletionModel for OpenAiCompletion {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        debug!(gateway = "OpenAI", model = %self.model, message_count = messages.len(), "completion request");

        let request_body = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage { role: role_str(m.role), content: &m.content })
                .collect(),
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| gateway_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| gateway_error(format!("failed to parse response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| gateway_error("API returned no completion choices"))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
