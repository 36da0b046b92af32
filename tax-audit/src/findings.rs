//! Typed audit findings

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::recompute::{TaxComputation, TaxKind};

/// Kind of discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Declared item tax differs from the recomputed amount
    TaxMismatch,
    /// PIS and COFINS bases derived without `vBC` disagree
    BaseDivergence,
    /// Declared totals disagree with the items or the totals formula
    TotalsMismatch,
    /// Purchase-order line unmatched or with a different amount
    OrderMismatch,
}

impl FindingKind {
    /// Severity weight added to the report score
    pub fn weight(&self) -> u32 {
        match self {
            FindingKind::TaxMismatch => 3,
            FindingKind::BaseDivergence => 1,
            FindingKind::TotalsMismatch => 5,
            FindingKind::OrderMismatch => 2,
        }
    }

    /// Where the finding belongs
    pub fn level(&self) -> FindingLevel {
        match self {
            FindingKind::TaxMismatch | FindingKind::BaseDivergence => FindingLevel::Item,
            FindingKind::TotalsMismatch => FindingLevel::Totals,
            FindingKind::OrderMismatch => FindingLevel::Order,
        }
    }
}

/// Scope of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingLevel {
    /// One line item
    Item,
    /// Document totals
    Totals,
    /// Purchase-order reconciliation
    Order,
}

/// One audit finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFinding {
    /// Finding kind
    pub kind: FindingKind,
    /// Scope
    pub level: FindingLevel,
    /// Stable code, e.g. `icms_incorrect` or `vnf_reconstruction`
    pub code: String,
    /// Item number, for item and order findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<u32>,
    /// Tax concerned, for tax mismatches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<TaxKind>,
    /// Explanation
    pub message: String,
    /// Value found in the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared: Option<Decimal>,
    /// Value the document should carry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Decimal>,
    /// Base used for the expected value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    /// Rate used for the expected value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
}

impl AuditFinding {
    /// Create a finding with no values attached
    pub fn new(kind: FindingKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            level: kind.level(),
            code: code.into(),
            item: None,
            tax: None,
            message: message.into(),
            declared: None,
            expected: None,
            base: None,
            rate: None,
        }
    }

    /// Tax mismatch on an item, carrying the base and rate used
    pub fn tax_mismatch(item: u32, computation: &TaxComputation) -> Self {
        let declared = computation.declared.unwrap_or(Decimal::ZERO);
        let message = format!(
            "{} declared {:.2} differs from expected {:.2} (base {:.2}, rate {})",
            computation.kind,
            declared,
            computation.computed,
            computation.base,
            computation.rate_label()
        );
        let code = format!("{}_incorrect", computation.kind.to_string().to_lowercase());

        let mut finding = Self::new(FindingKind::TaxMismatch, code, message)
            .with_item(item)
            .with_values(Some(declared), Some(computation.computed));
        finding.tax = Some(computation.kind);
        finding.base = Some(computation.base);
        finding.rate = Some(computation.rate_label());
        finding
    }

    /// Attach the item number
    pub fn with_item(mut self, item: u32) -> Self {
        self.item = Some(item);
        self
    }

    /// Attach declared and expected values
    pub fn with_values(mut self, declared: Option<Decimal>, expected: Option<Decimal>) -> Self {
        self.declared = declared;
        self.expected = expected;
        self
    }
}
