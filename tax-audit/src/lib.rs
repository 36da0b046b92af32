//! Tax recomputation and audit reconciliation
//!
//! Recomputes ICMS, PIS and COFINS per line item from the fields of a
//! [`nfe_extractor::NormalizedDocument`], then reconciles the results
//! against declared values, document totals and an optional purchase-order
//! sheet. Every comparison runs on exact decimals.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod config;
pub mod error;
pub mod findings;
pub mod orders;
pub mod recompute;
pub mod tolerance;

pub use audit::{AuditEngine, AuditReport, RiskLevel};
pub use config::{AuditConfig, RegimeSelector, RiskThresholds};
pub use error::{Error, Result};
pub use findings::{AuditFinding, FindingKind, FindingLevel};
pub use orders::{read_orders, read_orders_file, OrderLine};
pub use recompute::{
    BaseSource, ItemRecomputation, RateSource, Recomputation, Recomputer, SkipReason, TaxComputation,
    TaxKind,
};
pub use tolerance::{Tolerance, ToleranceCheck};
