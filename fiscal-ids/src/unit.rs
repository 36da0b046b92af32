//! Federative units and their regional grouping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Geographic region a federative unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Norte
    North,
    /// Nordeste
    Northeast,
    /// Centro-Oeste
    CentralWest,
    /// Sudeste
    Southeast,
    /// Sul
    South,
}

/// One of the 26 states or the Federal District
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FederativeUnit {
    AC, AL, AM, AP, BA, CE, DF, ES, GO, MA, MG, MS, MT, PA,
    PB, PE, PI, PR, RJ, RN, RO, RR, RS, SC, SE, SP, TO,
}

impl FederativeUnit {
    /// Every unit, in alphabetical order
    pub const ALL: [FederativeUnit; 27] = [
        Self::AC, Self::AL, Self::AM, Self::AP, Self::BA, Self::CE, Self::DF,
        Self::ES, Self::GO, Self::MA, Self::MG, Self::MS, Self::MT, Self::PA,
        Self::PB, Self::PE, Self::PI, Self::PR, Self::RJ, Self::RN, Self::RO,
        Self::RR, Self::RS, Self::SC, Self::SE, Self::SP, Self::TO,
    ];

    /// Two-letter code
    pub fn code(&self) -> &'static str {
        match self {
            Self::AC => "AC",
            Self::AL => "AL",
            Self::AM => "AM",
            Self::AP => "AP",
            Self::BA => "BA",
            Self::CE => "CE",
            Self::DF => "DF",
            Self::ES => "ES",
            Self::GO => "GO",
            Self::MA => "MA",
            Self::MG => "MG",
            Self::MS => "MS",
            Self::MT => "MT",
            Self::PA => "PA",
            Self::PB => "PB",
            Self::PE => "PE",
            Self::PI => "PI",
            Self::PR => "PR",
            Self::RJ => "RJ",
            Self::RN => "RN",
            Self::RO => "RO",
            Self::RR => "RR",
            Self::RS => "RS",
            Self::SC => "SC",
            Self::SE => "SE",
            Self::SP => "SP",
            Self::TO => "TO",
        }
    }

    /// Region the unit belongs to
    pub fn region(&self) -> Region {
        match self {
            Self::AC | Self::AM | Self::AP | Self::PA | Self::RO | Self::RR | Self::TO => {
                Region::North
            }
            Self::AL | Self::BA | Self::CE | Self::MA | Self::PB | Self::PE | Self::PI
            | Self::RN | Self::SE => Region::Northeast,
            Self::DF | Self::GO | Self::MS | Self::MT => Region::CentralWest,
            Self::ES | Self::MG | Self::RJ | Self::SP => Region::Southeast,
            Self::PR | Self::RS | Self::SC => Region::South,
        }
    }
}

impl FromStr for FederativeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.code() == code)
            .ok_or(Error::UnknownUnit(code))
    }
}

impl fmt::Display for FederativeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" sp ".parse::<FederativeUnit>().unwrap(), FederativeUnit::SP);
        assert_eq!("Df".parse::<FederativeUnit>().unwrap(), FederativeUnit::DF);
    }

    #[test]
    fn test_unknown_unit() {
        assert_eq!(
            "XX".parse::<FederativeUnit>(),
            Err(Error::UnknownUnit("XX".to_string()))
        );
    }

    #[test]
    fn test_region_counts() {
        let count = |r: Region| FederativeUnit::ALL.iter().filter(|u| u.region() == r).count();
        assert_eq!(count(Region::North), 7);
        assert_eq!(count(Region::Northeast), 9);
        assert_eq!(count(Region::CentralWest), 4);
        assert_eq!(count(Region::Southeast), 4);
        assert_eq!(count(Region::South), 3);
    }
}
