//! Centro-Oeste: MT, MS, GO, DF

use super::{check_length, check_prefix, RegistrationCheck, W9_2};
use crate::digits::{digits_of, dual_mod11, mod11, weighted_sum};
use crate::unit::FederativeUnit;
use crate::verdict::Verdict;

pub(super) const CHECKS: &[(FederativeUnit, RegistrationCheck)] = &[
    (FederativeUnit::MT, mato_grosso),
    (FederativeUnit::MS, mato_grosso_do_sul),
    (FederativeUnit::GO, goias),
    (FederativeUnit::DF, distrito_federal),
];

const GO_PREFIXES: [u32; 12] = [10, 11, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29];

fn mato_grosso(raw: &str) -> Verdict {
    let unit = FederativeUnit::MT;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[11], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..10], &[3, 2, 9, 8, 7, 6, 5, 4, 3, 2]));
    Verdict::compare(unit.code(), &[dv], &d[10..], "modulus 11, weights 3,2,9-2")
}

fn mato_grosso_do_sul(raw: &str) -> Verdict {
    let unit = FederativeUnit::MS;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &[28, 50], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11, weights 9-2")
}

fn goias(raw: &str) -> Verdict {
    let unit = FederativeUnit::GO;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &GO_PREFIXES, 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11, weights 9-2")
}

/// Thirteen digits starting with 07, two modulus 11 digits
fn distrito_federal(raw: &str) -> Verdict {
    let unit = FederativeUnit::DF;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[13], 2) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &[7], 2) {
        return v;
    }
    let computed = dual_mod11(
        &d[..11],
        &[4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2],
        &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2],
    );
    Verdict::compare(unit.code(), &computed, &d[11..], "modulus 11, two digits")
}
