//! Per-document report

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use cfop_engine::{
    Action, Badge, CoherenceItem, CoherenceRequest, CoherenceResponse, IcmsFields, OperationKind,
};
use nfe_extractor::{NormalizedDocument, ValidationMap};
use tax_audit::{AuditReport, Recomputation, RiskLevel};

/// Everything the pipeline learned about one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Caller-supplied label, usually the file path
    pub label: String,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Headline counts
    pub summary: ReportSummary,
    /// Normalized document
    pub document: NormalizedDocument,
    /// Identifier checks
    pub validations: ValidationMap,
    /// Recomputed taxes
    pub recomputation: Recomputation,
    /// Audit findings
    pub audit: AuditReport,
    /// CFOP coherence verdicts
    pub coherence: CoherenceResponse,
}

/// Headline counts of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Access key
    pub access_key: String,
    /// Emission timestamp, when `dhEmi` carries an offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<FixedOffset>>,
    /// Number of line items
    pub items: usize,
    /// Identifier checks that failed or could not run
    pub failed_validations: usize,
    /// Audit findings
    pub audit_findings: usize,
    /// Audit risk label
    pub audit_risk: RiskLevel,
    /// Items whose CFOP is blocked
    pub blocked_items: usize,
    /// Items not marked coherent
    pub flagged_items: usize,
    /// Operation kind of the document
    pub operation: OperationKind,
    /// Sector policy findings
    pub sector_findings: usize,
}

impl ReportSummary {
    /// Summarize the parts of a report
    pub fn of(
        document: &NormalizedDocument,
        validations: &ValidationMap,
        audit: &AuditReport,
        coherence: &CoherenceResponse,
    ) -> Self {
        Self {
            access_key: document.access_key.clone(),
            issued_at: DateTime::parse_from_rfc3339(document.issue.issued_at.trim()).ok(),
            items: document.items.len(),
            failed_validations: validations.values().filter(|v| v.is_failure()).count(),
            audit_findings: audit.findings.len(),
            audit_risk: audit.risk,
            blocked_items: coherence
                .items
                .iter()
                .filter(|v| v.decision.action == Action::Block)
                .count(),
            flagged_items: coherence
                .items
                .iter()
                .filter(|v| v.badge != Badge::Coherent)
                .count(),
            operation: coherence.classification.kind,
            sector_findings: coherence.classification.sector_findings.len(),
        }
    }
}

/// Coherence request for the items of a document
pub fn coherence_request(document: &NormalizedDocument) -> CoherenceRequest {
    let items = document
        .items
        .iter()
        .map(|item| {
            let icms = item
                .taxes
                .icms
                .as_ref()
                .map(|icms| IcmsFields {
                    cst: icms.cst.clone(),
                    csosn: icms.csosn.clone(),
                    st_base: icms.st_base,
                    st_rate: icms.st_rate,
                    st_amount: icms.st_amount,
                })
                .unwrap_or_default();

            CoherenceItem {
                number: Some(item.number),
                description: item.product.description.clone(),
                cfop: item.product.cfop.clone(),
                ncm: item.product.ncm.clone(),
                icms,
            }
        })
        .collect();

    CoherenceRequest {
        issuer_state: document.issuer.state().to_string(),
        recipient_state: document.recipient.state().to_string(),
        issuer_regime: document.issuer.regime.clone(),
        operation_type: document.issue.direction.clone(),
        sector: None,
        items,
        adjudicate: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfe_extractor::{Icms, LineItem, Product};

    #[test]
    fn test_coherence_request_mapping() {
        let mut document = NormalizedDocument::default();
        document.issuer.address.state = "SP".to_string();
        document.issuer.regime = "1".to_string();
        document.issue.direction = "0".to_string();
        document.recipient.address.state = "RJ".to_string();
        document.items.push(LineItem {
            number: 3,
            product: Product {
                description: "Refrigerante".to_string(),
                cfop: "6403".to_string(),
                ncm: "22021000".to_string(),
                ..Default::default()
            },
            ..Default::default()
        });
        document.items[0].taxes.icms = Some(Icms {
            group: "ICMSSN202".to_string(),
            csosn: "202".to_string(),
            ..Default::default()
        });
        document.items.push(LineItem {
            number: 4,
            ..Default::default()
        });

        let request = coherence_request(&document);
        assert_eq!(request.issuer_state, "SP");
        assert_eq!(request.recipient_state, "RJ");
        assert_eq!(request.issuer_regime, "1");
        assert_eq!(request.items[0].number, Some(3));
        assert_eq!(request.items[0].cfop, "6403");
        assert_eq!(request.items[0].icms.csosn, "202");
        assert!(request.items[0].icms.st_amount.is_none());
        assert_eq!(request.items[1].icms, IcmsFields::default());
        assert!(request.adjudicate.is_none());
        assert_eq!(request.operation_type, "0");
        assert!(request.sector.is_none());
    }
}
