//! CFOP nature versus trade direction

use serde::{Deserialize, Serialize};

/// State values used for foreign counterparties
const EXTERIOR_STATES: [&str; 4] = ["EX", "EXT", "EXTERIOR", "ZZ"];

/// Nature implied by the leading CFOP digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nature {
    /// 5xxx
    Internal,
    /// 6xxx
    Interstate,
    /// 7xxx
    Foreign,
    /// Any other leading digit (inbound codes)
    Undefined,
}

impl Nature {
    /// Nature of a CFOP
    pub fn of(cfop: &str) -> Self {
        match cfop.trim().chars().next() {
            Some('5') => Nature::Internal,
            Some('6') => Nature::Interstate,
            Some('7') => Nature::Foreign,
            _ => Nature::Undefined,
        }
    }
}

/// Actual direction of the operation, from the two states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    /// Same state
    Internal,
    /// Different states, or a state missing
    Interstate,
    /// Recipient abroad
    Foreign,
}

impl TradeDirection {
    /// Direction of an issuer/recipient pair
    pub fn between(issuer_state: &str, recipient_state: &str) -> Self {
        if is_exterior(recipient_state) {
            TradeDirection::Foreign
        } else if is_intra(issuer_state, recipient_state) {
            TradeDirection::Internal
        } else {
            TradeDirection::Interstate
        }
    }

    /// Leading CFOP digit for outbound codes in this direction
    pub fn family(&self) -> char {
        match self {
            TradeDirection::Internal => '5',
            TradeDirection::Interstate => '6',
            TradeDirection::Foreign => '7',
        }
    }
}

/// Whether a state value denotes a foreign counterparty
pub fn is_exterior(state: &str) -> bool {
    let state = state.trim().to_uppercase();
    EXTERIOR_STATES.contains(&state.as_str())
}

/// Both states present, equal, and the recipient not abroad
pub fn is_intra(issuer_state: &str, recipient_state: &str) -> bool {
    let issuer = issuer_state.trim().to_uppercase();
    let recipient = recipient_state.trim().to_uppercase();
    if is_exterior(&recipient) {
        return false;
    }
    !issuer.is_empty() && issuer == recipient
}

/// Whether the CFOP nature fits the state pair
///
/// Inbound codes (leading 1, 2, 3) are never flagged here.
pub fn is_compatible(issuer_state: &str, recipient_state: &str, cfop: &str) -> bool {
    match Nature::of(cfop) {
        Nature::Internal => is_intra(issuer_state, recipient_state),
        Nature::Interstate => !is_intra(issuer_state, recipient_state),
        Nature::Foreign => is_exterior(recipient_state),
        Nature::Undefined => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nature_of() {
        assert_eq!(Nature::of("5551"), Nature::Internal);
        assert_eq!(Nature::of("6102"), Nature::Interstate);
        assert_eq!(Nature::of("7101"), Nature::Foreign);
        assert_eq!(Nature::of("1501"), Nature::Undefined);
        assert_eq!(Nature::of(""), Nature::Undefined);
    }

    #[test]
    fn test_intra_state_code() {
        assert!(is_compatible("SP", "SP", "5551"));
        assert!(!is_compatible("SP", "RJ", "5551"));
        assert!(is_compatible("sp", " SP ", "5102"));
    }

    #[test]
    fn test_interstate_and_foreign() {
        assert!(is_compatible("SP", "RJ", "6102"));
        assert!(!is_compatible("SP", "SP", "6102"));
        assert!(is_compatible("SP", "EX", "7101"));
        assert!(!is_compatible("SP", "RJ", "7101"));
        assert!(!is_compatible("SP", "EX", "5102"));
    }

    #[test]
    fn test_trade_direction() {
        assert_eq!(TradeDirection::between("SP", "SP"), TradeDirection::Internal);
        assert_eq!(TradeDirection::between("SP", "MG"), TradeDirection::Interstate);
        assert_eq!(TradeDirection::between("SP", "exterior"), TradeDirection::Foreign);
        assert_eq!(TradeDirection::between("", ""), TradeDirection::Interstate);
    }
}
