//! Error types for DocSplit.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Chunk parameters outside their allowed bounds.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Upload produced no text once whitespace was normalized.
    #[error("Empty or unreadable input: {0}")]
    EmptyInput(String),

    /// A format handler could not decode the uploaded bytes.
    #[error("Failed to extract {format} content: {message}")]
    Extraction { format: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn extraction(format: impl Into<String>, message: impl ToString) -> Self {
        Self::Extraction {
            format: format.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure was caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameters(_) | Self::EmptyInput(_) | Self::Extraction { .. } | Self::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(Error::InvalidParameters("x".into()).is_client_error());
        assert!(Error::EmptyInput("x".into()).is_client_error());
        assert!(Error::extraction("pdf", "bad xref").is_client_error());
        assert!(Error::Http("no file".into()).is_client_error());
        assert!(!Error::Internal("boom".into()).is_client_error());
        assert!(!Error::Config("PORT".into()).is_client_error());
    }

    #[test]
    fn test_extraction_message_names_format() {
        let err = Error::extraction("docx", "missing word/document.xml");
        assert_eq!(
            err.to_string(),
            "Failed to extract docx content: missing word/document.xml"
        );
    }
}
