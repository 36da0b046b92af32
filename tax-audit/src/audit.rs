//! Audit reconciliation
//!
//! Turns a [`Recomputation`] into findings: item tax mismatches, PIS/COFINS
//! base divergence, totals reconciliation and the optional purchase-order
//! cross-check. The report score is the sum of finding weights; the risk
//! label depends only on the finding count.

use nfe_extractor::decimal::or_zero;
use nfe_extractor::{LineItem, NormalizedDocument};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::findings::{AuditFinding, FindingKind};
use crate::orders::OrderLine;
use crate::recompute::{BaseSource, ItemRecomputation, Recomputation, Recomputer};
use crate::tolerance::Tolerance;
use crate::{AuditConfig, RiskThresholds};

/// Overall risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl RiskLevel {
    /// Classify a finding count
    pub fn from_count(count: usize, thresholds: &RiskThresholds) -> Self {
        if count > thresholds.high_above {
            RiskLevel::High
        } else if count > thresholds.medium_above {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Result of auditing one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Findings in item, totals, order order
    pub findings: Vec<AuditFinding>,
    /// Sum of finding weights
    pub score: u32,
    /// Label derived from the finding count
    pub risk: RiskLevel,
}

impl AuditReport {
    fn from_findings(findings: Vec<AuditFinding>, thresholds: &RiskThresholds) -> Self {
        let score = findings.iter().map(|f| f.kind.weight()).sum();
        let risk = RiskLevel::from_count(findings.len(), thresholds);
        Self {
            findings,
            score,
            risk,
        }
    }

    /// No findings at all
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings of a kind
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }
}

/// Audit engine
pub struct AuditEngine {
    config: AuditConfig,
    recomputer: Recomputer,
}

impl AuditEngine {
    /// Create a new audit engine
    pub fn new(config: AuditConfig) -> Self {
        let recomputer = Recomputer::new(&config);
        Self { config, recomputer }
    }

    /// Configuration in use
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Recompute the taxes of a document
    pub fn recompute(&self, document: &NormalizedDocument) -> Recomputation {
        self.recomputer.recompute(document)
    }

    /// Recompute and reconcile in one pass
    pub fn audit(&self, document: &NormalizedDocument, orders: Option<&[OrderLine]>) -> AuditReport {
        let recomputation = self.recompute(document);
        self.reconcile(document, &recomputation, orders)
    }

    /// Reconcile an existing recomputation
    pub fn reconcile(
        &self,
        document: &NormalizedDocument,
        recomputation: &Recomputation,
        orders: Option<&[OrderLine]>,
    ) -> AuditReport {
        let mut findings = Vec::new();

        for item in &recomputation.items {
            findings.extend(self.item_findings(item));
        }
        findings.extend(self.totals_findings(document, recomputation));
        if let Some(orders) = orders {
            findings.extend(self.order_findings(&document.items, orders));
        }

        let report = AuditReport::from_findings(findings, &self.config.risk_thresholds);
        info!(
            "Audited document {}: {} findings, score {}, risk {:?}",
            document.access_key,
            report.findings.len(),
            report.score,
            report.risk
        );
        report
    }

    /// Tax mismatches and base divergence for one item
    pub fn item_findings(&self, item: &ItemRecomputation) -> Vec<AuditFinding> {
        let tolerance = Tolerance::items(&self.config);
        let mut findings = Vec::new();

        for computation in item.computations() {
            let Some(declared) = computation.declared else {
                continue;
            };
            if !computation.is_comparable() || computation.base <= Decimal::ZERO {
                continue;
            }
            if !tolerance.is_close(declared, computation.computed) {
                debug!(
                    "Item {} {} mismatch: declared {} computed {}",
                    item.item, computation.kind, declared, computation.computed
                );
                findings.push(AuditFinding::tax_mismatch(item.item, computation));
            }
        }

        if let (Some(pis), Some(cofins)) = (&item.pis, &item.cofins) {
            let neither_declared = pis.base_source != BaseSource::Declared
                && cofins.base_source != BaseSource::Declared;
            if neither_declared && !tolerance.is_close(pis.base, cofins.base) {
                findings.push(
                    AuditFinding::new(
                        FindingKind::BaseDivergence,
                        "bases_divergent",
                        format!(
                            "PIS base {:.2} and COFINS base {:.2} diverge; check vBC, discount and freight fields",
                            pis.base, cofins.base
                        ),
                    )
                    .with_item(item.item)
                    .with_values(Some(pis.base), Some(cofins.base)),
                );
            }
        }

        findings
    }

    /// Gross total against the items, document total against its formula
    pub fn totals_findings(
        &self,
        document: &NormalizedDocument,
        recomputation: &Recomputation,
    ) -> Vec<AuditFinding> {
        let tolerance = Tolerance::totals(&self.config);
        let totals = &document.totals;
        let mut findings = Vec::new();

        if let Some(declared) = totals.products {
            if !tolerance.is_close(declared, recomputation.gross_sum) {
                findings.push(
                    AuditFinding::new(
                        FindingKind::TotalsMismatch,
                        "vprod_items",
                        format!(
                            "Total vProd {:.2} differs from the item sum {:.2}",
                            declared, recomputation.gross_sum
                        ),
                    )
                    .with_values(Some(declared), Some(recomputation.gross_sum)),
                );
            }
        }

        if let Some(declared) = totals.document {
            let gross = totals.products.unwrap_or(recomputation.gross_sum);
            let reconstructed = gross - or_zero(totals.discount)
                + or_zero(totals.freight)
                + or_zero(totals.insurance)
                + or_zero(totals.other_expenses)
                + or_zero(totals.ipi);
            if !tolerance.is_close(declared, reconstructed) {
                findings.push(
                    AuditFinding::new(
                        FindingKind::TotalsMismatch,
                        "vnf_reconstruction",
                        format!(
                            "vNF {:.2} differs from reconstructed {:.2} (vProd - vDesc + vFrete + vSeg + vOutro + vIPI)",
                            declared, reconstructed
                        ),
                    )
                    .with_values(Some(declared), Some(reconstructed)),
                );
            }
        }

        findings
    }

    /// Purchase-order lines against the invoice items
    pub fn order_findings(&self, items: &[LineItem], orders: &[OrderLine]) -> Vec<AuditFinding> {
        let tolerance = Tolerance::items(&self.config);
        let mut findings = Vec::new();

        for order in orders {
            let Some(matched) = match_order(items, order) else {
                findings.push(AuditFinding::new(
                    FindingKind::OrderMismatch,
                    "order_item_not_found",
                    format!("Order line '{}' not found in the invoice", order.label()),
                ));
                continue;
            };

            let Some(expected) = order.expected_total() else {
                continue;
            };
            let gross = or_zero(matched.product.gross_amount);
            if !tolerance.is_close(gross, expected) {
                findings.push(
                    AuditFinding::new(
                        FindingKind::OrderMismatch,
                        "order_amount_divergent",
                        format!(
                            "Item '{}' vProd {:.2} differs from order total {:.2}",
                            matched.product.description, gross, expected
                        ),
                    )
                    .with_item(matched.number)
                    .with_values(Some(gross), Some(expected)),
                );
            }
        }

        findings
    }
}

/// Match by product code or barcode, then by description
fn match_order<'a>(items: &'a [LineItem], order: &OrderLine) -> Option<&'a LineItem> {
    let code = order.code.trim();
    if !code.is_empty() {
        let by_code = items
            .iter()
            .find(|item| item.product.code.trim() == code || item.product.ean.trim() == code);
        if by_code.is_some() {
            return by_code;
        }
    }

    let description = order.description.trim().to_lowercase();
    if description.is_empty() {
        return None;
    }
    items
        .iter()
        .find(|item| item.product.description.to_lowercase().contains(&description))
}
