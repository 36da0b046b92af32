//! National taxpayer numbers: CNPJ (companies) and CPF (individuals)

use crate::digits::{all_equal, digits_of, dual_mod11, weighted_sum};
use crate::verdict::Verdict;

const NATIONAL: &str = "BR";

const CNPJ_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_FIRST: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_SECOND: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validate a CNPJ; punctuation is ignored
pub fn validate_cnpj(raw: &str) -> Verdict {
    let digits = digits_of(raw);
    if digits.len() != 14 {
        return Verdict::malformed(
            NATIONAL,
            &digits,
            2,
            format!("CNPJ must have 14 digits, got {}", digits.len()),
        );
    }
    if all_equal(&digits) {
        return Verdict::malformed(NATIONAL, &digits, 2, "CNPJ with all digits equal");
    }
    let computed = dual_mod11(&digits[..12], &CNPJ_FIRST, &CNPJ_SECOND);
    Verdict::compare(NATIONAL, &computed, &digits[12..], "CNPJ modulus 11")
}

/// Validate a CPF; punctuation is ignored
pub fn validate_cpf(raw: &str) -> Verdict {
    let digits = digits_of(raw);
    if digits.len() != 11 {
        return Verdict::malformed(
            NATIONAL,
            &digits,
            2,
            format!("CPF must have 11 digits, got {}", digits.len()),
        );
    }
    if all_equal(&digits) {
        return Verdict::malformed(NATIONAL, &digits, 2, "CPF with all digits equal");
    }
    let computed = dual_mod11(&digits[..9], &CPF_FIRST, &CPF_SECOND);
    Verdict::compare(NATIONAL, &computed, &digits[9..], "CPF modulus 11")
}

/// Validate either kind, chosen by digit count
pub fn validate_tax_id(raw: &str) -> Verdict {
    match digits_of(raw).len() {
        11 => validate_cpf(raw),
        _ => validate_cnpj(raw),
    }
}

/// The two CNPJ check digits for a 12-digit body
pub fn cnpj_check_digits(body: &str) -> Option<String> {
    let digits = digits_of(body);
    if digits.len() != 12 {
        return None;
    }
    let [d1, d2] = dual_mod11(&digits, &CNPJ_FIRST, &CNPJ_SECOND);
    Some(format!("{d1}{d2}"))
}

/// Remainder of the first CNPJ check-digit sum, exposed for collision analysis
pub fn cnpj_first_remainder(body: &str) -> Option<u32> {
    let digits = digits_of(body);
    (digits.len() >= 12).then(|| weighted_sum(&digits[..12], &CNPJ_FIRST) % 11)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Outcome;

    #[test]
    fn test_valid_cnpj_with_punctuation() {
        let v = validate_cnpj("11.222.333/0001-81");
        assert!(v.valid, "{v:?}");
        assert_eq!(v.computed_check_digits, "81");
        assert_eq!(v.unit, "BR");
    }

    #[test]
    fn test_cnpj_wrong_check_digit() {
        let v = validate_cnpj("11222333000182");
        assert!(!v.valid);
        assert_eq!(v.computed_check_digits, "81");
        assert_eq!(v.supplied_check_digits, "82");
        assert_eq!(v.outcome, Outcome::Checked);
    }

    #[test]
    fn test_cnpj_all_equal_rejected() {
        let v = validate_cnpj("00000000000000");
        assert!(!v.valid);
        assert_eq!(v.outcome, Outcome::Malformed);
    }

    #[test]
    fn test_cnpj_wrong_length() {
        let v = validate_cnpj("1122233300018");
        assert!(!v.valid);
        assert!(v.reason.contains("14 digits"));
    }

    #[test]
    fn test_cpf() {
        assert!(validate_cpf("529.982.247-25").valid);
        assert!(!validate_cpf("529.982.247-24").valid);
        assert!(!validate_cpf("111.111.111-11").valid);
    }

    #[test]
    fn test_tax_id_dispatch() {
        assert!(validate_tax_id("52998224725").valid);
        assert!(validate_tax_id("12345678000195").valid);
    }

    #[test]
    fn test_cnpj_check_digits() {
        assert_eq!(cnpj_check_digits("112223330001").as_deref(), Some("81"));
        assert_eq!(cnpj_check_digits("1122"), None);
    }
}
