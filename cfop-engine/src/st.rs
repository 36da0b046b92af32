//! Tax-substitution (ST) evidence check

use rust_decimal::Decimal;

use crate::types::{IcmsFields, RuleFinding};

/// Rule identifier for ST findings
pub const ST_FIELDS: &str = "CFOP_ST_CAMPOS";

const ST_CST: [&str; 2] = ["60", "70"];
const ST_CSOSN: [&str; 4] = ["201", "202", "203", "500"];

const ST_PRONE_CODES: &[&str] = &[
    "2651", "2652", "2653", "3651", "3652", "3653", // fuel
    "5251", "5252", "5253", "5254", "5255", "5256", "5257", "5258", // energy
];

/// Whether the CFOP usually carries ST: the x4xx families plus fuel and energy
pub fn suggests_st(cfop: &str) -> bool {
    if cfop.len() != 4 || !cfop.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    cfop.as_bytes()[1] == b'4' || ST_PRONE_CODES.contains(&cfop)
}

/// Situation codes indicate ST
pub fn has_st_evidence(icms: &IcmsFields) -> bool {
    ST_CST.contains(&icms.cst.trim()) || ST_CSOSN.contains(&icms.csosn.trim())
}

fn missing(value: Option<Decimal>) -> bool {
    value.map_or(true, |v| v <= Decimal::ZERO)
}

/// Any of the ST base, rate or amount is zero or absent
pub fn st_fields_missing(icms: &IcmsFields) -> bool {
    missing(icms.st_base) || missing(icms.st_rate) || missing(icms.st_amount)
}

/// Evaluate the ST fields for an ST-prone CFOP
pub fn evaluate(cfop: &str, icms: &IcmsFields) -> Option<RuleFinding> {
    if !suggests_st(cfop) || !st_fields_missing(icms) {
        return None;
    }
    if has_st_evidence(icms) {
        Some(RuleFinding::critical(
            ST_FIELDS,
            "Situation code indicates ST, but ST fields are missing or zero",
        ))
    } else {
        Some(RuleFinding::warning(
            ST_FIELDS,
            "CFOP suggests ST, but there is no tax evidence of ST",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use rust_decimal_macros::dec;

    #[test]
    fn test_suggests_st() {
        assert!(suggests_st("5405"));
        assert!(suggests_st("6403"));
        assert!(suggests_st("2651"));
        assert!(suggests_st("5251"));
        assert!(!suggests_st("5102"));
        assert!(!suggests_st("54"));
    }

    #[test]
    fn test_evidence_without_fields_is_critical() {
        let icms = IcmsFields {
            cst: "60".to_string(),
            ..Default::default()
        };
        let finding = evaluate("5405", &icms).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.rule, ST_FIELDS);
    }

    #[test]
    fn test_no_evidence_without_fields_is_warning() {
        let icms = IcmsFields {
            cst: "00".to_string(),
            ..Default::default()
        };
        assert_eq!(evaluate("5405", &icms).unwrap().severity, Severity::Warning);
    }

    #[test]
    fn test_filled_fields_are_ok() {
        let icms = IcmsFields {
            csosn: "201".to_string(),
            st_base: Some(dec!(100.00)),
            st_rate: Some(dec!(18)),
            st_amount: Some(dec!(18.00)),
            ..Default::default()
        };
        assert!(evaluate("5405", &icms).is_none());
        assert!(evaluate("5102", &IcmsFields::default()).is_none());
    }
}
