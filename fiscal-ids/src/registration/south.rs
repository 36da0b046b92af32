//! Sul: RS, SC, PR

use super::{check_length, RegistrationCheck, W9_2};
use crate::digits::{digits_of, dual_mod11, mod11, weighted_sum};
use crate::unit::FederativeUnit;
use crate::verdict::Verdict;

pub(super) const CHECKS: &[(FederativeUnit, RegistrationCheck)] = &[
    (FederativeUnit::RS, rio_grande_do_sul),
    (FederativeUnit::SC, santa_catarina),
    (FederativeUnit::PR, parana),
];

fn rio_grande_do_sul(raw: &str) -> Verdict {
    let unit = FederativeUnit::RS;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[10], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..9], &[2, 9, 8, 7, 6, 5, 4, 3, 2]));
    Verdict::compare(unit.code(), &[dv], &d[9..], "modulus 11, weights 2,9-2")
}

fn santa_catarina(raw: &str) -> Verdict {
    let unit = FederativeUnit::SC;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[9], 1) {
        return v;
    }
    let dv = mod11(weighted_sum(&d[..8], &W9_2));
    Verdict::compare(unit.code(), &[dv], &d[8..], "modulus 11, weights 9-2")
}

fn parana(raw: &str) -> Verdict {
    let unit = FederativeUnit::PR;
    let d = digits_of(raw);
    if let Some(v) = check_length(unit, &d, &[10], 2) {
        return v;
    }
    let computed = dual_mod11(&d[..8], &[3, 2, 7, 6, 5, 4, 3, 2], &[4, 3, 2, 7, 6, 5, 4, 3, 2]);
    Verdict::compare(unit.code(), &computed, &d[8..], "modulus 11, two digits")
}
