//! The 44-digit NF-e access key (chave de acesso)

use serde::{Deserialize, Serialize};

use crate::digits::{digits_of, render};
use crate::error::{Error, Result};
use crate::verdict::Verdict;

/// Access key length
pub const ACCESS_KEY_LEN: usize = 44;

/// Check digit for the first 43 digits: weights 2..=9 cycling from the right
pub fn access_key_check_digit(body: &[u32]) -> u32 {
    let sum: u32 = body
        .iter()
        .rev()
        .zip((2u32..=9).cycle())
        .map(|(d, w)| d * w)
        .sum();
    match 11 - sum % 11 {
        dv if dv >= 10 => 0,
        dv => dv,
    }
}

/// Validate an access key; non-digits are ignored
pub fn validate_access_key(raw: &str) -> Verdict {
    let digits = digits_of(raw);
    if digits.len() != ACCESS_KEY_LEN {
        return Verdict::malformed(
            "BR",
            &digits,
            1,
            format!("access key must have 44 digits, got {}", digits.len()),
        );
    }
    let dv = access_key_check_digit(&digits[..43]);
    Verdict::compare("BR", &[dv], &digits[43..], "access key modulus 11")
}

/// Fields packed into an access key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    /// IBGE code of the issuing unit
    pub unit_code: String,
    /// Issue year and month, YYMM
    pub year_month: String,
    /// Issuer CNPJ
    pub issuer_cnpj: String,
    /// Document model (55 for NF-e, 65 for NFC-e)
    pub model: String,
    /// Series
    pub series: String,
    /// Document number
    pub number: String,
    /// Emission type
    pub emission_type: String,
    /// Random numeric code
    pub numeric_code: String,
    /// Check digit
    pub check_digit: String,
}

impl AccessKey {
    /// Split a 44-digit key into its fields; the check digit is not verified
    pub fn decode(raw: &str) -> Result<Self> {
        let digits = digits_of(raw);
        if digits.len() != ACCESS_KEY_LEN {
            return Err(Error::Malformed(format!(
                "access key must have 44 digits, got {}",
                digits.len()
            )));
        }
        let s = render(&digits);
        Ok(Self {
            unit_code: s[0..2].to_string(),
            year_month: s[2..6].to_string(),
            issuer_cnpj: s[6..20].to_string(),
            model: s[20..22].to_string(),
            series: s[22..25].to_string(),
            number: s[25..34].to_string(),
            emission_type: s[34..35].to_string(),
            numeric_code: s[35..43].to_string(),
            check_digit: s[43..44].to_string(),
        })
    }
}
