//! Error types for the coherence engine

use thiserror::Error;

/// Coherence engine error
///
/// Rule violations are findings, not errors. Adjudication failures never
/// leave [`crate::adjudicator`]; they degrade to a neutral opinion.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// CFOP catalogue could not be loaded
    #[error("Catalogue error: {0}")]
    Catalogue(String),

    /// Remote adjudication failed
    #[error("Adjudication unavailable: {0}")]
    AdjudicationUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::AdjudicationUnavailable(e.to_string())
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
