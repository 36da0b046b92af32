//! Request, response and verdict types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify::{Classification, PolicySector};

/// Severity of a rule finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks the item
    Critical,
    /// Needs attention
    Warning,
}

impl Severity {
    /// Score weight of one finding
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Critical => 40,
            Severity::Warning => 15,
        }
    }
}

/// A violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFinding {
    /// Severity
    pub severity: Severity,
    /// Stable rule identifier
    pub rule: String,
    /// Explanation
    pub message: String,
}

impl RuleFinding {
    /// Critical finding
    pub fn critical(rule: &str, message: &str) -> Self {
        Self {
            severity: Severity::Critical,
            rule: rule.to_string(),
            message: message.to_string(),
        }
    }

    /// Warning finding
    pub fn warning(rule: &str, message: &str) -> Self {
        Self {
            severity: Severity::Warning,
            rule: rule.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this finding is critical
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Final item badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Badge {
    /// No findings
    Coherent,
    /// Warnings only
    Attention,
    /// At least one critical finding
    Incoherent,
}

impl Badge {
    /// Badge for a set of findings
    pub fn from_findings(findings: &[RuleFinding]) -> Self {
        if findings.iter().any(|f| f.severity == Severity::Critical) {
            Badge::Incoherent
        } else if findings.iter().any(|f| f.severity == Severity::Warning) {
            Badge::Attention
        } else {
            Badge::Coherent
        }
    }
}

/// Recommended action for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Keep the informed CFOP
    Keep,
    /// Have someone review the item
    Review,
    /// Block; a replacement CFOP is suggested
    Block,
}

/// ICMS fields relevant to the ST check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmsFields {
    /// Situation code, normal regime
    pub cst: String,
    /// Situation code, simplified regime
    pub csosn: String,
    /// ST base (vBCST)
    pub st_base: Option<Decimal>,
    /// ST rate (pICMSST)
    pub st_rate: Option<Decimal>,
    /// ST amount (vICMSST)
    pub st_amount: Option<Decimal>,
}

/// One item to classify
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoherenceItem {
    /// Item number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Product description
    pub description: String,
    /// Informed CFOP
    pub cfop: String,
    /// Tariff code (NCM)
    #[serde(default)]
    pub ncm: String,
    /// ICMS sub-fields
    #[serde(default)]
    pub icms: IcmsFields,
}

/// Coherence request for one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoherenceRequest {
    /// Issuer state (UF)
    pub issuer_state: String,
    /// Recipient state (UF), or an exterior sentinel such as `EX`
    pub recipient_state: String,
    /// Issuer regime code (CRT)
    #[serde(default)]
    pub issuer_regime: String,
    /// `tpNF`: 0 inbound, 1 outbound
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operation_type: String,
    /// Sector policy to apply; derived from the NCM chapters when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<PolicySector>,
    /// Items
    pub items: Vec<CoherenceItem>,
    /// Per-request adjudication switch; `None` uses the engine default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjudicate: Option<bool>,
}

/// Keyword heuristic outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicSignal {
    /// A keyword family matched the CFOP and the nature check passed
    pub coherent: bool,
    /// Trace of what matched, e.g. `ok:venda->5101,5102`
    pub signals: Vec<String>,
    /// Nature check outcome
    pub nature_ok: bool,
}

/// Adjudication trace in the verdict
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationTrace {
    /// A remote opinion was requested
    pub used: bool,
    /// First characters of the raw reply
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_excerpt: String,
}

/// Consensus decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Recommended action
    pub action: Action,
    /// Adjudicator confidence, two decimals
    pub confidence: f64,
    /// Why
    pub reasons: Vec<String>,
    /// Heuristic signal
    pub heuristic: HeuristicSignal,
    /// Adjudication trace
    pub adjudication: AdjudicationTrace,
}

/// Verdict for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceVerdict {
    /// Item number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Product description
    pub description: String,
    /// Tariff code
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ncm: String,
    /// CFOP as informed
    pub informed_cfop: String,
    /// CFOP retained
    pub chosen_cfop: String,
    /// Replacement when blocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_cfop: Option<String>,
    /// Catalogue description of the retained CFOP
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cfop_description: String,
    /// Ranked candidate codes, informed code first
    pub candidates: Vec<String>,
    /// Decision
    pub decision: Decision,
    /// Findings from hard rules, nature and ST checks
    pub findings: Vec<RuleFinding>,
    /// Badge
    pub badge: Badge,
    /// Sum of finding weights
    pub score: u32,
}

/// Coherence response for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceResponse {
    /// Remote adjudication was used
    pub adjudicated: bool,
    /// Sum of item scores
    pub score: u32,
    /// One verdict per item, in request order
    pub items: Vec<CoherenceVerdict>,
    /// Document classification
    #[serde(default)]
    pub classification: Classification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_from_findings() {
        assert_eq!(Badge::from_findings(&[]), Badge::Coherent);
        let warning = RuleFinding::warning("W", "w");
        let critical = RuleFinding::critical("C", "c");
        assert_eq!(Badge::from_findings(&[warning.clone()]), Badge::Attention);
        assert_eq!(Badge::from_findings(&[warning, critical]), Badge::Incoherent);
    }

    #[test]
    fn test_wire_format() {
        let finding = RuleFinding::critical("CFOP_ST_CAMPOS", "msg");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["severity"], "CRITICAL");
        assert_eq!(serde_json::to_value(Action::Block).unwrap(), "block");
        assert_eq!(serde_json::to_value(Badge::Attention).unwrap(), "ATTENTION");
    }
}
