//! Completion gateway trait and backend selection.

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::Message;
use crate::error::{RagError, Result};

/// A gateway that maps a role-tagged message sequence to generated text.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate a completion for the given conversation.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// A short model name for logging and errors.
    fn name(&self) -> &str;
}

/// Selectable completion backends.
///
/// Unimplemented backends fail fast at construction with
/// [`RagError::UnsupportedProvider`] instead of silently returning nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    /// OpenAI chat completions (`gpt-4o-mini` by default).
    OpenAi,
    /// Local Llama serving. Planned, not implemented.
    Llama,
}

impl ModelBackend {
    /// Parse a backend name as used on the CLI.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "llama" => Ok(Self::Llama),
            other => Err(RagError::UnsupportedProvider(other.to_string())),
        }
    }

    /// Construct the completion gateway for this backend.
    ///
    /// # Errors
    ///
    /// [`RagError::UnsupportedProvider`] for backends without an
    /// implementation, [`RagError::Gateway`] for bad credentials.
    pub fn connect(self, api_key: &str) -> Result<Arc<dyn CompletionModel>> {
        match self {
            Self::OpenAi => Ok(Arc::new(crate::openai::OpenAiCompletion::new(api_key)?)),
            Self::Llama => Err(RagError::UnsupportedProvider("llama".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unimplemented_backend_fails_fast() {
        let err = ModelBackend::Llama.connect("key").map(|_| ()).unwrap_err();
        assert!(matches!(err, RagError::UnsupportedProvider(_)));
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!(ModelBackend::parse("openai").unwrap(), ModelBackend::OpenAi);
        assert_eq!(ModelBackend::parse("LLAMA").unwrap(), ModelBackend::Llama);
        assert!(matches!(
            ModelBackend::parse("claude"),
            Err(RagError::UnsupportedProvider(_))
        ));
    }
}
