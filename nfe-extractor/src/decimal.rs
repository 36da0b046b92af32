//! Monetary leaf parsing

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Parse a decimal leaf value
///
/// Blank input is `None`. A comma is read as the decimal separator.
/// Unparseable text is also `None`, so callers can tell a declared zero
/// apart from a value that was never there.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace(',', ".");
    match Decimal::from_str(&normalized) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding non-decimal value {:?}: {}", trimmed, e);
            None
        }
    }
}

/// Value or zero
pub fn or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}
