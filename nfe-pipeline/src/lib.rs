//! End-to-end NF-e audit pipeline
//!
//! Runs one document through extraction, identifier validation, tax
//! recomputation, audit reconciliation and CFOP coherence, and gathers the
//! results into a single [`DocumentReport`]. Documents share no state, so
//! batches can run as independent tasks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use report::{coherence_request, DocumentReport, ReportSummary};
