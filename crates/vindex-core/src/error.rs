//! Error types for vindex.

use thiserror::Error;

/// Main error type for pipelines built on top of an index.
#[derive(Error, Debug)]
pub enum Error {
    /// Index operation failed
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Errors returned by [`Index`](crate::Index) implementations.
///
/// Everything that originates in a backend is wrapped in
/// [`IndexError::Internal`], so callers can tell a contract violation on
/// their side (wrong filter variant, zero `top_k`) apart from an
/// environment failure without knowing any backend error type.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The caller violated the index contract.
    #[error("configuration error: {0}")]
    Config(String),

    /// The backend or its environment failed.
    #[error("internal index error: {0}")]
    Internal(#[from] BackendError),
}

impl IndexError {
    /// Returns true if the error originated in the backend.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Returns the backend error, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            Self::Internal(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

/// Backend-originated failures.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("index state check failed: {0}")]
    IndexState(String),

    #[error("malformed stored vector: {0}")]
    Encoding(#[from] CodecError),

    #[error("index not found: {0}")]
    NotFound(String),

    #[error("backend command failed: {0}")]
    Command(String),
}

/// Vector codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("byte length {len} is not a multiple of 4")]
    TrailingBytes { len: usize },
}

/// Embedding errors.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("embedder returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}

/// Result type alias for vindex pipelines.
pub type Result<T> = std::result::Result<T, Error>;
