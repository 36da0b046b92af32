//! Error types for fiscal identifiers

use thiserror::Error;

/// Fiscal identifier error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Federative unit code not recognised
    #[error("Unknown federative unit: {0}")]
    UnknownUnit(String),

    /// Identifier could not be decoded
    #[error("Malformed identifier: {0}")]
    Malformed(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
