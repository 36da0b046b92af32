//! Error types for the pipeline

use thiserror::Error;

/// Pipeline error
///
/// Only extraction failures and I/O stop a document. Audit and coherence
/// problems are findings inside the report.
#[derive(Debug, Error)]
pub enum Error {
    /// The document could not be extracted
    #[error(transparent)]
    Extraction(#[from] nfe_extractor::Error),

    /// Audit configuration or order sheet
    #[error("Audit error: {0}")]
    Audit(#[from] tax_audit::Error),

    /// Coherence engine setup
    #[error("Coherence error: {0}")]
    Coherence(#[from] cfop_engine::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a document
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path as given
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Label of the document this error belongs to, when known
    pub fn document(&self) -> Option<&str> {
        match self {
            Error::Extraction(e) => Some(e.document()),
            Error::Read { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
