//! Nordeste: MA, PI, CE, PB, SE, RN, PE, AL, BA

use super::{check_length, check_prefix, RegistrationCheck, W9_2};
use crate::digits::{digits_of, mod11, weighted_sum};
use crate::unit::FederativeUnit;
use crate::verdict::Verdict;

pub(super) const CHECKS: &[(FederativeUnit, RegistrationCheck)] = &[
    (FederativeUnit::MA, maranhao),
    (FederativeUnit::PI, piaui),
    (FederativeUnit::CE, ceara),
    (FederativeUnit::PB, paraiba),
    (FederativeUnit::SE, sergipe),
    (FederativeUnit::RN, rio_grande_do_norte),
    (FederativeUnit::PE, pernambuco),
    (FederativeUnit::AL, alagoas),
    (FederativeUnit::BA, bahia),
];

/// Nine digits, weights 9-2, modulus 11
fn plain_nine(unit: FederativeUnit, raw: &str, prefixes: &[u32]) -> Verdict {
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    if !prefixes.is_empty() {
        if let Some(v) = check_prefix(unit, &d, prefixes, 1) {
            return v;
        }
    }
    let dv = mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11, weights 9-2")
}

fn maranhao(raw: &str) -> Verdict {
    plain_nine(FederativeUnit::MA, raw, &[12])
}

fn piaui(raw: &str) -> Verdict {
    plain_nine(FederativeUnit::PI, raw, &[])
}

fn ceara(raw: &str) -> Verdict {
    plain_nine(FederativeUnit::CE, raw, &[])
}

fn paraiba(raw: &str) -> Verdict {
    plain_nine(FederativeUnit::PB, raw, &[])
}

fn sergipe(raw: &str) -> Verdict {
    plain_nine(FederativeUnit::SE, raw, &[])
}

/// `(sum * 10) % 11`, where 10 becomes 0
fn times_ten_mod11(sum: u32) -> u32 {
    match (sum * 10) % 11 {
        10 => 0,
        dv => dv,
    }
}

fn rio_grande_do_norte(raw: &str) -> Verdict {
    let unit = FederativeUnit::RN;
    let d = digits_of(raw);
    if let Some(v) = check_prefix(unit, &d, &[20], 1) {
        return v;
    }
    if let Some(v) = check_length(unit, &d, &[9, 10], 1) {
        return v;
    }
    let body = &d[..d.len() - 1];
    let sum = if d.len() == 9 {
        weighted_sum(body, &W9_2)
    } else {
        weighted_sum(body, &[10, 9, 8, 7, 6, 5, 4, 3, 2])
    };
    Verdict::compare(
        unit.code(),
        &[times_ten_mod11(sum)],
        &d[d.len() - 1..],
        "modulus 11 over ten times the sum",
    )
}

fn pernambuco(raw: &str) -> Verdict {
    let unit = FederativeUnit::PE;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 2) {
        return v;
    }
    let body = &d[..7];
    let d1 = mod11(weighted_sum(body, &[8, 7, 6, 5, 4, 3, 2]));
    let d2 = mod11(weighted_sum(body, &[9, 8, 7, 6, 5, 4, 3]) + d1 * 2);
    Verdict::compare(unit.code(), &[d1, d2], &d[7..], "modulus 11, two digits")
}

fn alagoas(raw: &str) -> Verdict {
    let unit = FederativeUnit::AL;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    if let Some(v) = check_prefix(unit, &d, &[24], 1) {
        return v;
    }
    if ![0, 3, 5, 7, 8].contains(&d[2]) {
        return Verdict::malformed(unit.code(), &d, 1, format!("unexpected company type {}", d[2]));
    }
    let dv = times_ten_mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11 over ten times the sum")
}

/// Bahia switches between modulus 10 and 11 on a decisive digit.
fn bahia_digit(sum: u32, modulus: u32) -> u32 {
    if modulus == 10 {
        match sum % 10 {
            0 => 0,
            r => 10 - r,
        }
    } else {
        mod11(sum)
    }
}

fn bahia_modulus(decisive: u32) -> u32 {
    if [0, 1, 2, 3, 4, 5, 8].contains(&decisive) {
        10
    } else {
        11
    }
}

fn bahia(raw: &str) -> Verdict {
    let unit = FederativeUnit::BA;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[8, 9], 2) {
        return v;
    }
    // Eight digits: first digit decides; nine digits: second digit decides.
    let (body_len, modulus) = if d.len() == 8 {
        (6, bahia_modulus(d[0]))
    } else {
        (7, bahia_modulus(d[1]))
    };
    let body = &d[..body_len];
    let second_weights: Vec<u32> = (2..=body_len as u32 + 1).rev().collect();
    let first_weights: Vec<u32> = (2..=body_len as u32 + 2).rev().collect();

    // The second check digit is computed first and sits before the first one.
    let d2 = bahia_digit(weighted_sum(body, &second_weights), modulus);
    if d2 != d[body_len] {
        return Verdict {
            reason: format!("second check digit wrong, modulus {modulus}"),
            ..Verdict::compare(unit.code(), &[d2], &d[body_len..body_len + 1], "")
        };
    }
    let mut extended = body.to_vec();
    extended.push(d2);
    let d1 = bahia_digit(weighted_sum(&extended, &first_weights), modulus);
    Verdict::compare(
        unit.code(),
        &[d2, d1],
        &d[body_len..],
        &format!("modulus {modulus}, two digits"),
    )
}
