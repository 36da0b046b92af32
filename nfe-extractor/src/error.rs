//! Error types for document extraction

use thiserror::Error;

/// Extraction error; both kinds are terminal for the document concerned
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bytes are not well-formed, safe XML
    #[error("Invalid document {document}: {reason}")]
    InvalidDocument {
        /// Caller-supplied document label
        document: String,
        /// Parser message
        reason: String,
    },

    /// A required element is missing
    #[error("Structure not found in {document}: missing <{node}>")]
    StructureNotFound {
        /// Caller-supplied document label
        document: String,
        /// Local name of the missing element
        node: String,
    },
}

impl Error {
    /// Label of the document that failed
    pub fn document(&self) -> &str {
        match self {
            Error::InvalidDocument { document, .. } | Error::StructureNotFound { document, .. } => {
                document
            }
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
