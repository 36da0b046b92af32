//! Error types for tax audit

use thiserror::Error;

/// Tax audit error
///
/// Mismatches found while auditing are never errors; they are reported as
/// [`crate::AuditFinding`] values.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Purchase-order sheet could not be read
    #[error("Order sheet error: {0}")]
    OrderSheet(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::OrderSheet(e.to_string())
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
