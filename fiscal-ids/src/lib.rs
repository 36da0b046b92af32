//! Fiscal identifier check digits for Brazilian electronic invoices
//!
//! Covers the national taxpayer numbers (CNPJ, CPF), the 44-digit NF-e
//! access key and the state registration (inscrição estadual) of all
//! 27 federative units. Every check reports a [`Verdict`] instead of
//! failing: malformed input is a verdict with `valid == false`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access_key;
pub mod error;
pub mod registration;
pub mod tax_id;
pub mod unit;
pub mod verdict;

mod digits;

pub use access_key::{validate_access_key, AccessKey};
pub use error::{Error, Result};
pub use registration::{validate_registration, validate_registration_for};
pub use tax_id::{validate_cnpj, validate_cpf, validate_tax_id};
pub use unit::{FederativeUnit, Region};
pub use verdict::{Outcome, Verdict};
