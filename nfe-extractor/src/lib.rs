//! NF-e document extractor
//!
//! Parses raw NF-e XML (with or without the `nfeProc` envelope) into a
//! [`NormalizedDocument`]. Elements are looked up by local name only, so
//! namespace prefixes never matter. Monetary fields are exact decimals.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decimal;
pub mod error;
pub mod model;
pub mod ncm;
pub mod parser;
pub mod validation;

mod xml;

pub use error::{Error, Result};
pub use model::*;
pub use parser::{extract, extract_document, Extraction};
pub use validation::{validate_document, ValidationEntry, ValidationMap};
