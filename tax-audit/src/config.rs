//! Configuration for the audit engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Environment variable holding the PIS/COFINS regime selector
pub const REGIME_ENV: &str = "NFE_PISCOFINS_REGIME";

/// Global regime used when a document omits the PIS/COFINS rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeSelector {
    /// No fallback; missing rates stay at zero
    #[default]
    #[serde(rename = "unset")]
    Unset,
    /// Presumed profit: PIS 0.65%, COFINS 3.00%
    #[serde(rename = "presumido")]
    PresumedProfit,
    /// Real profit: PIS 1.65%, COFINS 7.60%
    #[serde(rename = "real")]
    RealProfit,
}

impl RegimeSelector {
    /// Default (PIS, COFINS) rates in percent, if a regime is selected
    pub fn default_rates(&self) -> Option<(Decimal, Decimal)> {
        match self {
            RegimeSelector::Unset => None,
            RegimeSelector::PresumedProfit => Some((Decimal::new(65, 2), Decimal::new(300, 2))),
            RegimeSelector::RealProfit => Some((Decimal::new(165, 2), Decimal::new(760, 2))),
        }
    }
}

impl FromStr for RegimeSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "unset" | "auto" => Ok(RegimeSelector::Unset),
            "presumido" | "presumed" => Ok(RegimeSelector::PresumedProfit),
            "real" => Ok(RegimeSelector::RealProfit),
            other => Err(Error::InvalidConfig(format!(
                "Unknown PIS/COFINS regime '{}', expected 'presumido' or 'real'",
                other
            ))),
        }
    }
}

impl fmt::Display for RegimeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RegimeSelector::Unset => "unset",
            RegimeSelector::PresumedProfit => "presumido",
            RegimeSelector::RealProfit => "real",
        };
        write!(f, "{}", label)
    }
}

/// Finding-count thresholds for the risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// More findings than this is at least medium risk
    pub medium_above: usize,
    /// More findings than this is high risk
    pub high_above: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium_above: 3,
            high_above: 10,
        }
    }
}

/// Audit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// PIS/COFINS rate fallback
    pub regime: RegimeSelector,

    /// Absolute tolerance for item taxes and order lines
    pub item_tolerance: Decimal,

    /// Absolute tolerance for document totals
    pub totals_tolerance: Decimal,

    /// Relative tolerance, as a fraction of the declared amount
    pub relative_tolerance: Decimal,

    /// Risk label thresholds
    pub risk_thresholds: RiskThresholds,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            regime: RegimeSelector::Unset,
            item_tolerance: Decimal::new(1, 2),   // 0.01
            totals_tolerance: Decimal::new(5, 2), // 0.05
            relative_tolerance: Decimal::new(1, 2), // 1%
            risk_thresholds: RiskThresholds::default(),
        }
    }
}

impl AuditConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuditConfig = toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = AuditConfig::default();

        if let Ok(regime) = std::env::var(REGIME_ENV) {
            config.regime = regime.parse()?;
        }

        Ok(config)
    }

    /// Reject negative tolerances and inverted thresholds
    pub fn validate(&self) -> Result<()> {
        if self.item_tolerance.is_sign_negative()
            || self.totals_tolerance.is_sign_negative()
            || self.relative_tolerance.is_sign_negative()
        {
            return Err(Error::InvalidConfig("Tolerances must not be negative".to_string()));
        }
        if self.risk_thresholds.high_above < self.risk_thresholds.medium_above {
            return Err(Error::InvalidConfig(format!(
                "high_above ({}) is below medium_above ({})",
                self.risk_thresholds.high_above, self.risk_thresholds.medium_above
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.regime, RegimeSelector::Unset);
        assert_eq!(config.item_tolerance, dec!(0.01));
        assert_eq!(config.totals_tolerance, dec!(0.05));
        assert_eq!(config.risk_thresholds.medium_above, 3);
    }

    #[test]
    fn test_regime_parsing() {
        assert_eq!("".parse::<RegimeSelector>().unwrap(), RegimeSelector::Unset);
        assert_eq!(" Real ".parse::<RegimeSelector>().unwrap(), RegimeSelector::RealProfit);
        assert_eq!(
            "presumido".parse::<RegimeSelector>().unwrap(),
            RegimeSelector::PresumedProfit
        );
        assert!("simples".parse::<RegimeSelector>().is_err());
    }

    #[test]
    fn test_default_rates() {
        assert_eq!(RegimeSelector::Unset.default_rates(), None);
        assert_eq!(
            RegimeSelector::RealProfit.default_rates(),
            Some((dec!(1.65), dec!(7.60)))
        );
        assert_eq!(
            RegimeSelector::PresumedProfit.default_rates(),
            Some((dec!(0.65), dec!(3.00)))
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "regime = \"real\"\ntotals_tolerance = \"0.10\"").unwrap();

        let config = AuditConfig::from_file(file.path()).unwrap();
        assert_eq!(config.regime, RegimeSelector::RealProfit);
        assert_eq!(config.totals_tolerance, dec!(0.10));
        assert_eq!(config.item_tolerance, dec!(0.01));
    }

    #[test]
    fn test_from_file_rejects_inverted_thresholds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[risk_thresholds]\nmedium_above = 5\nhigh_above = 2").unwrap();

        let err = AuditConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
