//! Error types for coref-scorer.

use thiserror::Error;

/// Result type for coref-scorer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for coref-scorer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Partition or match-map error from the core crate.
    #[error(transparent)]
    Core(#[from] coref_scorer_core::Error),

    /// A clustering line does not hold exactly two integers.
    #[error("Malformed input at line {line}: {content:?} (expected `<mention_id> <cluster_id>`)")]
    MalformedInput {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Evaluation error.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error while processing one document of a corpus.
    #[error("document {doc_id}: {source}")]
    Document {
        /// Document identifier (or its position in the corpus).
        doc_id: String,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a malformed input error.
    pub fn malformed(line: usize, content: impl Into<String>) -> Self {
        Error::MalformedInput {
            line,
            content: content.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create an evaluation error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Error::Evaluation(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Attach a document identifier.
    pub fn in_document(self, doc_id: impl Into<String>) -> Self {
        Error::Document {
            doc_id: doc_id.into(),
            source: Box::new(self),
        }
    }

    /// Whether the error is a referential-integrity failure (fatal for the
    /// document being scored).
    #[must_use]
    pub fn is_referential_integrity(&self) -> bool {
        match self {
            Error::Core(coref_scorer_core::Error::ReferentialIntegrity { .. }) => true,
            Error::Document { source, .. } => source.is_referential_integrity(),
            _ => false,
        }
    }
}
