//! Configuration for remote adjudication

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result};

/// Remote adjudicator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjudicatorConfig {
    /// Adjudicate by default when a request does not say
    pub enabled: bool,

    /// Text-generation endpoint; derived from `model` when empty
    pub endpoint: String,

    /// Bearer token
    pub api_token: String,

    /// Model identifier
    pub model: String,

    /// Per-call timeout (ms)
    pub timeout_ms: u64,

    /// Maximum generated tokens
    pub max_new_tokens: u32,

    /// Sampling temperature
    pub temperature: f64,

    /// Attempts while the remote model reports it is loading
    pub max_attempts: u32,

    /// First backoff delay (ms); doubled after each attempt
    pub initial_backoff_ms: u64,
}

impl Default for AdjudicatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_token: String::new(),
            model: "microsoft/Phi-3.5-mini-instruct".to_string(),
            timeout_ms: 60_000, // 60 seconds
            max_new_tokens: 220,
            temperature: 0.0,
            max_attempts: 3,
            initial_backoff_ms: 2_000,
        }
    }
}

impl AdjudicatorConfig {
    /// Load from environment variables
    ///
    /// Adjudication defaults to on when a token is present.
    pub fn from_env() -> Result<Self> {
        let mut config = AdjudicatorConfig::default();

        if let Ok(token) = std::env::var("NFE_ADJUDICATION_TOKEN") {
            config.enabled = !token.trim().is_empty();
            config.api_token = token.trim().to_string();
        }

        if let Ok(enabled) = std::env::var("NFE_ADJUDICATION_ENABLED") {
            config.enabled = parse_flag(&enabled)?;
        }

        if let Ok(url) = std::env::var("NFE_ADJUDICATION_URL") {
            config.endpoint = url.trim().to_string();
        }

        if let Ok(model) = std::env::var("NFE_ADJUDICATION_MODEL") {
            config.model = model.trim().to_string();
        }

        if let Ok(timeout) = std::env::var("NFE_ADJUDICATION_TIMEOUT_MS") {
            config.timeout_ms = timeout.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("NFE_ADJUDICATION_TIMEOUT_MS is not a number: {}", timeout))
            })?;
        }

        if let Ok(tokens) = std::env::var("NFE_ADJUDICATION_MAX_NEW_TOKENS") {
            config.max_new_tokens = tokens.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("NFE_ADJUDICATION_MAX_NEW_TOKENS is not a number: {}", tokens))
            })?;
        }

        if let Ok(temperature) = std::env::var("NFE_ADJUDICATION_TEMPERATURE") {
            config.temperature = temperature.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!(
                    "NFE_ADJUDICATION_TEMPERATURE is not a number: {}",
                    temperature
                ))
            })?;
        }

        Ok(config)
    }

    /// Endpoint to call
    pub fn resolved_endpoint(&self) -> String {
        if self.endpoint.is_empty() && !self.model.is_empty() {
            format!("https://api-inference.huggingface.co/models/{}", self.model)
        } else {
            self.endpoint.clone()
        }
    }

    /// Adjudication can run: a token and an endpoint are configured
    pub fn is_available(&self) -> bool {
        !self.api_token.is_empty() && !self.resolved_endpoint().is_empty()
    }

    /// Enabled and available
    pub fn is_active(&self) -> bool {
        self.enabled && self.is_available()
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::InvalidConfig(format!(
            "NFE_ADJUDICATION_ENABLED is not a flag: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_inactive() {
        let config = AdjudicatorConfig::default();
        assert!(!config.is_active());
        assert!(!config.is_available());
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_endpoint_derived_from_model() {
        let config = AdjudicatorConfig::default();
        assert_eq!(
            config.resolved_endpoint(),
            "https://api-inference.huggingface.co/models/microsoft/Phi-3.5-mini-instruct"
        );

        let config = AdjudicatorConfig {
            endpoint: "http://localhost:9000/generate".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_endpoint(), "http://localhost:9000/generate");
    }

    #[test]
    fn test_forced_off_without_token() {
        let config = AdjudicatorConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(!config.is_active());

        let config = AdjudicatorConfig {
            enabled: true,
            api_token: "hf_token".to_string(),
            ..Default::default()
        };
        assert!(config.is_active());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
