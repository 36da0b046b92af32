//! CFOP coherence engine
//!
//! Decides, per line item, whether the informed CFOP fits the product
//! description, the trade direction and the ST fields. The pipeline runs
//! hard rules, the nature check, the ST evidence check, keyword heuristics,
//! candidate generation and an optional remote adjudication, then fuses
//! them into a single action (keep, review or block) and a badge. Each
//! document is also classified by operation kind, cost center and sector.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adjudicator;
pub mod candidates;
pub mod catalogue;
pub mod classify;
pub mod config;
pub mod consensus;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod nature;
pub mod rules;
pub mod st;
pub mod terms;
pub mod types;

pub use adjudicator::{
    AdjudicationContext, AdjudicationOpinion, Adjudicator, CandidateCode, OpinionSeverity,
    RemoteAdjudicator,
};
pub use catalogue::CfopCatalogue;
pub use classify::{Classification, OperationKind, PolicySector};
pub use config::AdjudicatorConfig;
pub use consensus::Consensus;
pub use engine::CoherenceEngine;
pub use error::{Error, Result};
pub use types::*;
