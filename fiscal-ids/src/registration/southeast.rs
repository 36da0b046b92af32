//! Sudeste: RJ, ES, MG, SP

use super::{check_length, RegistrationCheck, W9_2};
use crate::digits::{digit_sum, digits_of, mod11, weighted_sum};
use crate::unit::FederativeUnit;
use crate::verdict::Verdict;

pub(super) const CHECKS: &[(FederativeUnit, RegistrationCheck)] = &[
    (FederativeUnit::RJ, rio_de_janeiro),
    (FederativeUnit::ES, espirito_santo),
    (FederativeUnit::MG, minas_gerais),
    (FederativeUnit::SP, sao_paulo),
];

const SP_WEIGHTS: [u32; 8] = [1, 3, 4, 5, 6, 7, 8, 10];

fn rio_de_janeiro(raw: &str) -> Verdict {
    let unit = FederativeUnit::RJ;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[8], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..7], &[2, 7, 6, 5, 4, 3, 2]));
    Verdict::compare(unit.code(), &[dv], &d[7..], "modulus 11, weights 2,7-2")
}

fn espirito_santo(raw: &str) -> Verdict {
    let unit = FederativeUnit::ES;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11, weights 9-2")
}

/// Thirteen digits: eleven of body, then D1 and D2. A fourteen-digit
/// input carries a filler at position 12 that takes no part in the sums.
fn minas_gerais(raw: &str) -> Verdict {
    let unit = FederativeUnit::MG;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[13, 14], 2) {
        return v;
    }
    let body = &d[..11];

    // D1: a zero is inserted after the municipality code, weights alternate
    // 1 and 2, and the digits of each product are added up.
    let mut block = body[..3].to_vec();
    block.push(0);
    block.extend_from_slice(&body[3..]);
    let total: u32 = block
        .iter()
        .zip([1u32, 2].iter().cycle())
        .map(|(n, w)| digit_sum(n * w))
        .sum();
    let d1 = (10 - total % 10) % 10;

    let mut extended = body.to_vec();
    extended.push(d1);
    let d2 = mod11(weighted_sum(&extended, &[3, 2, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2]));

    Verdict::compare(unit.code(), &[d1, d2], &d[d.len() - 2..], "alternating modulus 10 then modulus 11")
}

fn sao_paulo(raw: &str) -> Verdict {
    if raw.trim().to_ascii_uppercase().starts_with('P') {
        sao_paulo_rural(raw)
    } else {
        sao_paulo_industrial(raw)
    }
}

/// Twelve digits with check digits at positions 9 and 12
fn sao_paulo_industrial(raw: &str) -> Verdict {
    let unit = FederativeUnit::SP;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[12], 2) {
        return v;
    }
    let supplied = [d[8], d[11]];
    let d9 = weighted_sum(&d[..8], &SP_WEIGHTS) % 11 % 10;
    if d9 != d[8] {
        return Verdict {
            reason: "first check digit wrong".to_string(),
            ..Verdict::compare(unit.code(), &[d9], &supplied, "")
        };
    }
    let d12 = weighted_sum(&d[..11], &[3, 2, 10, 9, 8, 7, 6, 5, 4, 3, 2]) % 11 % 10;
    Verdict::compare(unit.code(), &[d9, d12], &supplied, "modulus 11, rightmost digit of remainder")
}

/// Rural producer: "P" followed by twelve digits, check digit at position 9
fn sao_paulo_rural(raw: &str) -> Verdict {
    let unit = FederativeUnit::SP;
    let cleaned: String = raw
        .to_ascii_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'P')
        .collect();
    let d = digits_of(&cleaned);
    if !cleaned.starts_with('P') || cleaned.len() != 13 || d.len() != 12 {
        let supplied = d.get(8).map(|x| vec![*x]).unwrap_or_default();
        return Verdict::malformed(unit.code(), &supplied, 1, format!("invalid rural producer format ({cleaned})"));
    }
    let dv = weighted_sum(&d[..8], &SP_WEIGHTS) % 11 % 10;
    Verdict::compare(unit.code(), &[dv], &d[8..9], "rural producer, modulus 11")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minas_gerais_fourteen_digits() {
        // Filler inserted at position 12 of a valid 13-digit number.
        assert!(minas_gerais("9467987047943").valid);
        assert!(minas_gerais("94679870479043").valid);
    }

    #[test]
    fn test_sp_industrial_first_digit() {
        assert!(sao_paulo("653665865378").valid);
        let v = sao_paulo("653665867378");
        assert!(!v.valid);
        assert!(v.reason.contains("first check digit"));
    }

    #[test]
    fn test_sp_rural_producer() {
        assert!(sao_paulo("p-21299722.0/033").valid);
        let v = sao_paulo("P2129972");
        assert!(!v.valid);
        assert!(v.reason.contains("rural producer"));
    }

    #[test]
    fn test_rj_and_es() {
        assert!(rio_de_janeiro("32.897.72-0").valid);
        assert!(espirito_santo("406214131").valid);
    }
}
