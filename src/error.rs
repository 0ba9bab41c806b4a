use std::io;

use thiserror::Error;

/// Errors raised by the vectorizer.
#[derive(Debug, Error)]
pub enum VectorizerError {
    /// The document stream could not be read to the end.
    /// Nothing from that document reaches the corpus.
    #[error("failed to read document stream: {0}")]
    StreamRead(#[from] io::Error),

    /// Rejected at construction time.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, VectorizerError>;
