//! Hard structural rules
//!
//! Each rule ties a CFOP family to the description terms it requires or
//! forbids. Rule identifiers are stable and part of the response format.

use tracing::debug;

use crate::nature::{self, TradeDirection};
use crate::terms::{self, contains_any};
use crate::types::RuleFinding;

/// Nature of the code conflicts with the state pair
pub const NATURE_MISMATCH: &str = "CFOP_INCONSISTENTE_UF";
/// Fixed-asset code without asset terms
pub const ASSET_IMPLAUSIBLE: &str = "CFOP_X551_ATIVO_INVEROSSIMIL";
/// Consumption code that looks like an asset
pub const CONSUMPTION_LOOKS_ASSET: &str = "CFOP_X556_PARECE_ATIVO";
/// Consumption code with a very short description
pub const CONSUMPTION_POOR_DESCRIPTION: &str = "CFOP_X556_DESC_POBRE";
/// Bonus code without bonus terms
pub const BONUS_TERM_MISSING: &str = "CFOP_59_69_BONIF_TERMO_AUSENTE";
/// Sample code without sample terms
pub const SAMPLE_TERM_MISSING: &str = "CFOP_59_69_AMOSTRA_TERMO_AUSENTE";
/// Demonstration code without demonstration terms
pub const DEMONSTRATION_TERM_MISSING: &str = "CFOP_59_69_DEMONS_TERMO_AUSENTE";
/// Energy code without energy terms
pub const NOT_ENERGY: &str = "CFOP_525X_NAO_PARECE_ENERGIA";
/// Fuel code without fuel terms
pub const NOT_FUEL: &str = "CFOP_26_36XX_NAO_PARECE_COMBUSTIVEL";
/// Service code without service terms
pub const SERVICE_TERM_MISSING: &str = "CFOP_53_63_73XX_SERVICO_TERMO_AUSENTE";
/// Industrialisation code that looks like a finished good
pub const NOT_INDUSTRIAL_INPUT: &str = "CFOP_X501_NAO_PARECE_INSUMO";
/// Standard sale that looks like a service
pub const SALE_LOOKS_SERVICE: &str = "CFOP_5101_6101_SERVICO_INADEQUADO";
/// Standard sale that looks like an asset
pub const SALE_LOOKS_ASSET: &str = "CFOP_5101_6101_PARECE_ATIVO";

const ASSET_CODES: &[&str] = &["1551", "2551", "3551", "5551", "6551"];
const CONSUMPTION_CODES: &[&str] = &["1556", "2556", "3556", "5556", "6556"];
const BONUS_CODES: &[&str] = &["2910", "5910", "6910"];
const SAMPLE_CODES: &[&str] = &["2911", "5911", "6911"];
const DEMONSTRATION_CODES: &[&str] = &["2912", "2913", "5912", "5913", "6912", "6913"];
const ENERGY_CODES: &[&str] = &["5251", "5252", "5253", "5254", "5255", "5256", "5257", "5258"];
const FUEL_CODES: &[&str] = &["2651", "2652", "2653", "3651", "3652", "3653"];
const INDUSTRIAL_CODES: &[&str] = &["1501", "2501", "3501", "5501", "6501"];
const STANDARD_SALE_CODES: &[&str] = &["5101", "5102", "6101", "6102"];

/// Middle digits shared by every service code
const SERVICE_SENTINEL: &str = "30";

/// Descriptions shorter than this are too poor for a consumption code
const MIN_CONSUMPTION_DESCRIPTION: usize = 6;

fn is_service_code(cfop: &str) -> bool {
    matches!(cfop.chars().next(), Some('5' | '6' | '7')) && cfop.get(1..3) == Some(SERVICE_SENTINEL)
}

/// Apply the structural rules to one item
///
/// `description` must already be normalized with [`terms::normalize`].
pub fn structural_findings(cfop: &str, description: &str) -> Vec<RuleFinding> {
    let mut findings = Vec::new();

    if ASSET_CODES.contains(&cfop) && !contains_any(description, terms::ASSET) {
        findings.push(RuleFinding::critical(
            ASSET_IMPLAUSIBLE,
            "x551: description does not look like a fixed asset",
        ));
    }

    if CONSUMPTION_CODES.contains(&cfop) {
        if contains_any(description, terms::ASSET) {
            findings.push(RuleFinding::critical(
                CONSUMPTION_LOOKS_ASSET,
                "x556: consumption material but the description looks like an asset",
            ));
        } else if !contains_any(description, terms::CONSUMPTION)
            && description.chars().count() < MIN_CONSUMPTION_DESCRIPTION
        {
            findings.push(RuleFinding::warning(
                CONSUMPTION_POOR_DESCRIPTION,
                "x556: description too poor for consumption material",
            ));
        }
    }

    if BONUS_CODES.contains(&cfop) && !contains_any(description, terms::BONUS) {
        findings.push(RuleFinding::warning(
            BONUS_TERM_MISSING,
            "Bonus/donation without typical terms",
        ));
    }
    if SAMPLE_CODES.contains(&cfop) && !contains_any(description, terms::SAMPLE) {
        findings.push(RuleFinding::warning(
            SAMPLE_TERM_MISSING,
            "Sample shipment without the word 'amostra'",
        ));
    }
    if DEMONSTRATION_CODES.contains(&cfop) && !contains_any(description, terms::DEMONSTRATION) {
        findings.push(RuleFinding::warning(
            DEMONSTRATION_TERM_MISSING,
            "Demonstration shipment without demonstration terms",
        ));
    }

    if ENERGY_CODES.contains(&cfop) && !contains_any(description, terms::ENERGY) {
        findings.push(RuleFinding::critical(
            NOT_ENERGY,
            "525x: description does not look like electric energy",
        ));
    }
    if FUEL_CODES.contains(&cfop) && !contains_any(description, terms::FUEL) {
        findings.push(RuleFinding::critical(
            NOT_FUEL,
            "26/36xx: description does not look like fuel",
        ));
    }

    if is_service_code(cfop) && !contains_any(description, terms::SERVICE) {
        findings.push(RuleFinding::critical(
            SERVICE_TERM_MISSING,
            "Service code without typical service terms",
        ));
    }

    if INDUSTRIAL_CODES.contains(&cfop)
        && contains_any(description, terms::FINISHED_GOOD)
        && !contains_any(description, terms::INDUSTRIAL_INPUT)
    {
        findings.push(RuleFinding::critical(
            NOT_INDUSTRIAL_INPUT,
            "x501: looks like a finished good, not an industrial input",
        ));
    }

    if STANDARD_SALE_CODES.contains(&cfop) {
        if contains_any(description, terms::SERVICE) {
            findings.push(RuleFinding::critical(
                SALE_LOOKS_SERVICE,
                "Standard sale but the description looks like a service",
            ));
        }
        if contains_any(description, terms::ASSET) {
            findings.push(RuleFinding::warning(
                SALE_LOOKS_ASSET,
                "Looks like a fixed asset; consider x551",
            ));
        }
    }

    for finding in &findings {
        debug!("CFOP {} violates {}", cfop, finding.rule);
    }
    findings
}

/// Critical finding when the CFOP nature conflicts with the state pair
pub fn nature_finding(issuer_state: &str, recipient_state: &str, cfop: &str) -> Option<RuleFinding> {
    if nature::is_compatible(issuer_state, recipient_state, cfop) {
        None
    } else {
        debug!(
            "CFOP {} conflicts with {} -> {}",
            cfop, issuer_state, recipient_state
        );
        Some(RuleFinding::critical(
            NATURE_MISMATCH,
            "CFOP conflicts with the nature of the operation (state pair vs. CFOP)",
        ))
    }
}

/// Replacement code for a blocked item
///
/// Precedence: asset, then service, then finished good, then the default
/// production sale. The variant follows the actual trade direction.
pub fn suggest_replacement(direction: TradeDirection, description: &str) -> String {
    let internal = direction == TradeDirection::Internal;
    let (intra, inter) = if contains_any(description, terms::ASSET) {
        ("5551", "6551")
    } else if contains_any(description, terms::SERVICE) {
        ("5301", "6301")
    } else if contains_any(description, terms::FINISHED_GOOD) {
        ("5102", "6102")
    } else {
        ("5101", "6101")
    };
    let code = if internal { intra } else { inter };
    code.to_string()
}
