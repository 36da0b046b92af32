//! Identifier checks attached to an extracted document
//!
//! Nothing here can fail extraction: a check that cannot run becomes a
//! [`ValidationEntry::Error`] in the map.

use std::collections::BTreeMap;

use fiscal_ids::{
    validate_access_key, validate_cnpj, validate_cpf, validate_registration_for, AccessKey, FederativeUnit,
    Outcome, Verdict,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{NormalizedDocument, Party, TaxId};

/// Issuer state registration
pub const ISSUER_REGISTRATION: &str = "ie_issuer";
/// Recipient state registration
pub const RECIPIENT_REGISTRATION: &str = "ie_recipient";
/// Access key check digit
pub const ACCESS_KEY: &str = "access_key";
/// Issuer CNPJ embedded in the access key against `<emit><CNPJ>`
pub const ACCESS_KEY_ISSUER: &str = "access_key_issuer";
/// Issuer CNPJ/CPF
pub const ISSUER_TAX_ID: &str = "issuer_tax_id";
/// Recipient CNPJ/CPF
pub const RECIPIENT_TAX_ID: &str = "recipient_tax_id";

/// Outcome of one identifier check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationEntry {
    /// The checksum ran
    Checked(Verdict),
    /// The document does not carry this identifier
    NotInformed,
    /// The check could not run
    Error(String),
}

impl ValidationEntry {
    /// Whether this entry is a failed verdict or an error
    pub fn is_failure(&self) -> bool {
        match self {
            ValidationEntry::Checked(v) => !v.valid,
            ValidationEntry::NotInformed => false,
            ValidationEntry::Error(_) => true,
        }
    }
}

/// Map keyed by the constants in this module
pub type ValidationMap = BTreeMap<String, ValidationEntry>;

/// Run every identifier check for a document
pub fn validate_document(doc: &NormalizedDocument) -> ValidationMap {
    let mut map = ValidationMap::new();
    map.insert(ISSUER_REGISTRATION.to_string(), registration_entry(&doc.issuer));
    map.insert(RECIPIENT_REGISTRATION.to_string(), registration_entry(&doc.recipient));
    map.insert(ISSUER_TAX_ID.to_string(), tax_id_entry(&doc.issuer));
    map.insert(RECIPIENT_TAX_ID.to_string(), tax_id_entry(&doc.recipient));

    if doc.access_key.is_empty() {
        map.insert(ACCESS_KEY.to_string(), ValidationEntry::NotInformed);
    } else {
        map.insert(
            ACCESS_KEY.to_string(),
            ValidationEntry::Checked(validate_access_key(&doc.access_key)),
        );
        map.insert(ACCESS_KEY_ISSUER.to_string(), key_issuer_entry(doc));
    }

    for (name, entry) in &map {
        if let ValidationEntry::Error(reason) = entry {
            warn!("Validation {} could not run: {}", name, reason);
        }
    }
    map
}

fn registration_entry(party: &Party) -> ValidationEntry {
    let registration = party.state_registration.trim();
    if registration.is_empty() {
        return ValidationEntry::NotInformed;
    }
    if party.state().is_empty() {
        return ValidationEntry::Error("state code missing from address".to_string());
    }
    match party.state().parse::<FederativeUnit>() {
        Ok(unit) => ValidationEntry::Checked(validate_registration_for(unit, registration)),
        Err(e) => ValidationEntry::Error(e.to_string()),
    }
}

fn tax_id_entry(party: &Party) -> ValidationEntry {
    match &party.tax_id {
        Some(TaxId::Cnpj(digits)) => ValidationEntry::Checked(validate_cnpj(digits)),
        Some(TaxId::Cpf(digits)) => ValidationEntry::Checked(validate_cpf(digits)),
        None => ValidationEntry::NotInformed,
    }
}

fn key_issuer_entry(doc: &NormalizedDocument) -> ValidationEntry {
    let key = match AccessKey::decode(&doc.access_key) {
        Ok(key) => key,
        Err(e) => return ValidationEntry::Error(e.to_string()),
    };
    let Some(TaxId::Cnpj(issuer)) = &doc.issuer.tax_id else {
        return ValidationEntry::NotInformed;
    };
    let valid = &key.issuer_cnpj == issuer;
    ValidationEntry::Checked(Verdict {
        unit: "BR".to_string(),
        valid,
        computed_check_digits: key.issuer_cnpj,
        supplied_check_digits: issuer.clone(),
        reason: if valid {
            "access key issuer matches".to_string()
        } else {
            "access key issuer differs from <emit> CNPJ".to_string()
        },
        outcome: Outcome::Checked,
    })
}
