//! Tolerance rule for declared vs. recomputed amounts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AuditConfig;

/// Outcome of one tolerance comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceCheck {
    /// Whether the gap is within the allowance
    pub within: bool,
    /// |declared - computed|
    pub absolute_difference: Decimal,
    /// Larger of the relative and absolute allowances
    pub allowed: Decimal,
}

/// Two amounts are close when their gap is within
/// `max(|declared| * relative, absolute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance {
    /// Fixed allowance in currency units
    pub absolute: Decimal,
    /// Fraction of the declared amount
    pub relative: Decimal,
}

impl Tolerance {
    /// Create a tolerance
    pub fn new(absolute: Decimal, relative: Decimal) -> Self {
        Self { absolute, relative }
    }

    /// Tolerance for item taxes and order lines
    pub fn items(config: &AuditConfig) -> Self {
        Self::new(config.item_tolerance, config.relative_tolerance)
    }

    /// Tolerance for document totals
    pub fn totals(config: &AuditConfig) -> Self {
        Self::new(config.totals_tolerance, config.relative_tolerance)
    }

    /// Compare a declared amount with a computed one
    pub fn check(&self, declared: Decimal, computed: Decimal) -> ToleranceCheck {
        let absolute_difference = (declared - computed).abs();
        let allowed = (declared.abs() * self.relative).max(self.absolute);

        ToleranceCheck {
            within: absolute_difference <= allowed,
            absolute_difference,
            allowed,
        }
    }

    /// Shorthand for `check(..).within`
    pub fn is_close(&self, declared: Decimal, computed: Decimal) -> bool {
        self.check(declared, computed).within
    }
}
