//! Check-digit verdicts

use serde::{Deserialize, Serialize};

use crate::digits::render;

/// How a verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Check digits were computed and compared
    Checked,
    /// Registration declared exempt ("ISENTO")
    Exempt,
    /// Wrong length, prefix or type code; nothing was computed
    Malformed,
    /// No algorithm for the given unit code
    UnknownUnit,
}

/// Result of validating one identifier
///
/// `unit` is the federative unit code for state registrations and
/// `"BR"` for national identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Unit code the identifier was checked against
    pub unit: String,
    /// Whether the supplied check digits match
    pub valid: bool,
    /// Check digits computed from the body
    pub computed_check_digits: String,
    /// Check digits found in the input
    pub supplied_check_digits: String,
    /// Human-readable explanation
    pub reason: String,
    /// Outcome tag
    pub outcome: Outcome,
}

impl Verdict {
    /// Compare computed against supplied check digits
    pub(crate) fn compare(unit: &str, computed: &[u32], supplied: &[u32], method: &str) -> Self {
        let valid = computed == supplied;
        let reason = if valid {
            format!("{method}: check digits match")
        } else {
            format!("{method}: check digit mismatch")
        };
        Self {
            unit: unit.to_string(),
            valid,
            computed_check_digits: render(computed),
            supplied_check_digits: render(supplied),
            reason,
            outcome: Outcome::Checked,
        }
    }

    /// Input rejected before any computation; the trailing `check_len`
    /// digits are reported as supplied
    pub(crate) fn malformed(unit: &str, digits: &[u32], check_len: usize, reason: impl Into<String>) -> Self {
        let tail = &digits[digits.len().saturating_sub(check_len)..];
        Self {
            unit: unit.to_string(),
            valid: false,
            computed_check_digits: String::new(),
            supplied_check_digits: render(tail),
            reason: reason.into(),
            outcome: Outcome::Malformed,
        }
    }

    pub(crate) fn exempt(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            valid: true,
            computed_check_digits: String::new(),
            supplied_check_digits: String::new(),
            reason: "exempt".to_string(),
            outcome: Outcome::Exempt,
        }
    }

    pub(crate) fn unknown_unit(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            valid: false,
            computed_check_digits: String::new(),
            supplied_check_digits: String::new(),
            reason: format!("no registration algorithm for unit '{unit}'"),
            outcome: Outcome::UnknownUnit,
        }
    }

    /// Whether the registration was declared exempt
    pub fn is_exempt(&self) -> bool {
        self.outcome == Outcome::Exempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_keeps_trailing_digits() {
        let v = Verdict::malformed("RJ", &[1, 2, 3], 2, "invalid length (3)");
        assert!(!v.valid);
        assert_eq!(v.supplied_check_digits, "23");
        assert_eq!(v.outcome, Outcome::Malformed);
    }

    #[test]
    fn test_malformed_on_empty_input() {
        let v = Verdict::malformed("RJ", &[], 2, "invalid length (0)");
        assert_eq!(v.supplied_check_digits, "");
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let v = Verdict::exempt("SP");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["outcome"], "exempt");
        assert_eq!(json["valid"], true);
    }
}
