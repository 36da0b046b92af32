//! Process-wide configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use cfop_engine::AdjudicatorConfig;
use tax_audit::AuditConfig;

use crate::{Error, Result};

/// Environment variable naming a CFOP catalogue file
pub const CATALOGUE_ENV: &str = "NFE_CFOP_CATALOGUE";

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recomputation and reconciliation
    pub audit: AuditConfig,

    /// Remote CFOP adjudication
    pub adjudicator: AdjudicatorConfig,

    /// `code;description` file replacing the built-in CFOP catalogue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfop_catalogue_path: Option<PathBuf>,
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.audit.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config {
            audit: AuditConfig::from_env()?,
            adjudicator: AdjudicatorConfig::from_env()?,
            cfop_catalogue_path: None,
        };

        if let Ok(path) = std::env::var(CATALOGUE_ENV) {
            if !path.trim().is_empty() {
                config.cfop_catalogue_path = Some(PathBuf::from(path.trim()));
            }
        }

        Ok(config)
    }
}
