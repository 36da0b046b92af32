//! Norte: AC, AM, AP, PA, RO, RR, TO

use super::{check_length, check_prefix, RegistrationCheck, W9_2};
use crate::digits::{digits_of, dual_mod11, mod11, weighted_sum};
use crate::unit::FederativeUnit;
use crate::verdict::Verdict;

pub(super) const CHECKS: &[(FederativeUnit, RegistrationCheck)] = &[
    (FederativeUnit::AC, acre),
    (FederativeUnit::AM, amazonas),
    (FederativeUnit::AP, amapa),
    (FederativeUnit::PA, para),
    (FederativeUnit::RO, rondonia),
    (FederativeUnit::RR, roraima),
    (FederativeUnit::TO, tocantins),
];

fn acre(raw: &str) -> Verdict {
    let unit = FederativeUnit::AC;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[13], 2) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &[1], 2) {
        return v;
    }
    let computed = dual_mod11(
        &d[..11],
        &[4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2],
        &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2],
    );
    Verdict::compare(unit.code(), &computed, &d[11..], "modulus 11, two digits")
}

fn amazonas(raw: &str) -> Verdict {
    let unit = FederativeUnit::AM;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11, weights 9-2")
}

fn amapa(raw: &str) -> Verdict {
    let unit = FederativeUnit::AP;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &[3], 1) {
        return v;
    }
    let number = d[..8].iter().fold(0u32, |acc, x| acc * 10 + x);
    let (p, fallback) = match number {
        3_000_001..=3_017_000 => (5, 0),
        3_017_001..=3_019_022 => (9, 1),
        _ => (0, 0),
    };
    let sum = p + weighted_sum(&d[..8], &W9_2);
    let dv = match 11 - sum % 11 {
        10 => 0,
        11 => fallback,
        dv => dv,
    };
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11 with range offset")
}

fn para(raw: &str) -> Verdict {
    let unit = FederativeUnit::PA;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &[15, 75, 76, 77, 78, 79], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11, weights 2-9 from the right")
}

fn rondonia(raw: &str) -> Verdict {
    let unit = FederativeUnit::RO;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9, 14], 1) {
        return v;
    }
    // Legacy 9-digit form: only the five company digits after the municipality count.
    let sum = if d.len() == 9 {
        weighted_sum(&d[3..8], &[6, 5, 4, 3, 2])
    } else {
        weighted_sum(&d[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2])
    };
    let mut dv = 11 - sum % 11;
    if dv >= 10 {
        dv -= 10;
    }
    Verdict::compare(unit.code(), &[dv], &d[d.len() - 1..], "modulus 11")
}

fn roraima(raw: &str) -> Verdict {
    let unit = FederativeUnit::RR;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &[24], 1) {
        return v;
    }
    let sum: u32 = d[..8].iter().zip(1u32..).map(|(n, w)| n * w).sum();
    Verdict::compare(unit.code(), &[sum % 9], &d[8..], "modulus 9, ascending weights")
}

fn tocantins(raw: &str) -> Verdict {
    let unit = FederativeUnit::TO;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    let kind = d[2] * 10 + d[3];
    if ![1, 2, 3, 99].contains(&kind) {
        return Verdict::malformed(unit.code(), &d, 1, format!("unexpected type code {kind:02}"));
    }
    // Type code digits are left out of the sum.
    let base = [d[0], d[1], d[4], d[5], d[6], d[7]];
    let dv = mod11(weighted_sum(&base, &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11 without type code")
}
