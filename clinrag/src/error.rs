//! Error types for the `clinrag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval pipeline operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Bad collection or dimension setup. Fatal — aborts startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An insert batch whose vector and payload counts disagree.
    ///
    /// Fatal to the call, not the process. Nothing is inserted.
    #[error("arity mismatch: {vectors} vectors vs {payloads} payload entries")]
    ArityMismatch {
        /// Number of vectors in the rejected batch.
        vectors: usize,
        /// Number of payload entries in the rejected batch.
        payloads: usize,
    },

    /// A caller contract violation (e.g. `top_k == 0`, unknown collection).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A source document that could not be read or parsed.
    ///
    /// Recoverable: the document is skipped and batch ingestion continues.
    #[error("parse error ({document}): {message}")]
    Parse {
        /// The file name of the offending document.
        document: String,
        /// A description of the failure.
        message: String,
    },

    /// An external gateway call exceeded its deadline.
    ///
    /// Retryable; surfaced only after the bounded retry budget is spent.
    #[error("gateway timeout ({gateway}) after {timeout_secs}s")]
    GatewayTimeout {
        /// The gateway that timed out.
        gateway: String,
        /// The deadline that expired, in seconds.
        timeout_secs: u64,
    },

    /// An embedding or completion service failure.
    #[error("gateway error ({gateway}): {message}")]
    Gateway {
        /// The gateway that produced the error.
        gateway: String,
        /// A description of the failure.
        message: String,
    },

    /// A model backend that has no implementation.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
}

impl RagError {
    /// Whether a bounded retry is worthwhile for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RagError::GatewayTimeout { .. } | RagError::Gateway { .. })
    }
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
