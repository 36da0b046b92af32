//! State registration (inscrição estadual) check digits
//!
//! Each federative unit has its own length, prefix and checksum rules.
//! The region submodules each contribute a slice of `(unit, check)`
//! pairs; [`validate_registration`] dispatches through one flat table.

mod central_west;
mod north;
mod northeast;
mod south;
mod southeast;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::digits::leading_pair;
use crate::unit::FederativeUnit;
use crate::verdict::Verdict;

/// Marker accepted in place of a registration number
pub const EXEMPT_MARKER: &str = "ISENTO";

/// Signature every per-unit algorithm implements
pub type RegistrationCheck = fn(&str) -> Verdict;

pub(crate) const W9_2: [u32; 8] = [9, 8, 7, 6, 5, 4, 3, 2];

static CHECKS: Lazy<HashMap<FederativeUnit, RegistrationCheck>> = Lazy::new(|| {
    north::CHECKS
        .iter()
        .chain(northeast::CHECKS)
        .chain(central_west::CHECKS)
        .chain(southeast::CHECKS)
        .chain(south::CHECKS)
        .copied()
        .collect()
});

/// Validate a registration for the unit named by `unit_code`
pub fn validate_registration(unit_code: &str, raw: &str) -> Verdict {
    match unit_code.parse::<FederativeUnit>() {
        Ok(unit) => validate_registration_for(unit, raw),
        Err(_) => {
            let code = unit_code.trim().to_ascii_uppercase();
            debug!("No registration algorithm for unit {:?}", code);
            Verdict::unknown_unit(&code)
        }
    }
}

/// Validate a registration for a known unit
pub fn validate_registration_for(unit: FederativeUnit, raw: &str) -> Verdict {
    if raw.trim().eq_ignore_ascii_case(EXEMPT_MARKER) {
        return Verdict::exempt(unit.code());
    }
    match CHECKS.get(&unit) {
        Some(check) => check(raw),
        None => Verdict::unknown_unit(unit.code()),
    }
}

/// Malformed verdict when the digit count is not one of `allowed`
pub(crate) fn check_length(
    unit: FederativeUnit,
    digits: &[u32],
    allowed: &[usize],
    check_len: usize,
) -> Option<Verdict> {
    (!allowed.contains(&digits.len())).then(|| {
        Verdict::malformed(
            unit.code(),
            digits,
            check_len,
            format!("invalid length ({})", digits.len()),
        )
    })
}

/// Malformed verdict when the leading two digits are not one of `allowed`
pub(crate) fn check_prefix(
    unit: FederativeUnit,
    digits: &[u32],
    allowed: &[u32],
    check_len: usize,
) -> Option<Verdict> {
    let prefix = leading_pair(digits);
    (!allowed.contains(&prefix)).then(|| {
        Verdict::malformed(
            unit.code(),
            digits,
            check_len,
            format!("unexpected prefix {prefix:02}"),
        )
    })
}
