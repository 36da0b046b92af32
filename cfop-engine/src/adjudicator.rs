//! Remote adjudication
//!
//! Sends the item context and candidate codes to a text-generation endpoint
//! and reads back a one-line JSON opinion. Transport errors, timeouts and
//! unparseable replies never escape: they become a neutral ATTENTION
//! opinion with zero confidence.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AdjudicatorConfig;
use crate::types::CoherenceItem;
use crate::{Error, Result};

static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object regex"));

/// Characters of the raw reply kept in the opinion
const RAW_EXCERPT_CHARS: usize = 800;

/// Confidence at or above which a not-coherent opinion forces review
pub const REVIEW_CONFIDENCE: f64 = 0.6;

const RULE_PREAMBLE: &str = "Hard rules (follow strictly):\n\
- 5xxx: intra-state operation; 6xxx: interstate; 7xxx: foreign.\n\
- x551 (fixed asset) requires a durable good.\n\
- x556 (use/consumption) must not look like a fixed asset.\n\
- x501 (industrialisation) requires input/raw-material terms; do NOT accept finished goods.\n\
- 5101/5102/6101/6102 = ordinary sale; do not accept pure services or fixed assets.\n\
- 53xx/63xx/73xx = services; service terms are required.\n\
- 2910/5910/6910 bonus/donation; 2911/5911/6911 sample; 2912/2913/59xx/69xx demonstration.\n\
- 525x energy; 265x/365x fuel.\n\
- Do not presume ST without evidence.";

/// Severity reported by the adjudicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpinionSeverity {
    /// Code fits
    Coherent,
    /// Doubtful
    Attention,
    /// Code does not fit
    Incoherent,
}

impl OpinionSeverity {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "COHERENT" | "COERENTE" => OpinionSeverity::Coherent,
            "INCOHERENT" | "INCOERENTE" => OpinionSeverity::Incoherent,
            _ => OpinionSeverity::Attention,
        }
    }
}

/// Opinion on one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjudicationOpinion {
    /// A reply was obtained and parsed
    pub available: bool,
    /// The adjudicator considers the code coherent
    pub coherent: bool,
    /// Reported severity
    pub severity: OpinionSeverity,
    /// Confidence in 0..=1
    pub confidence: f64,
    /// Reasons given
    pub reasons: Vec<String>,
    /// Raw reply excerpt
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw: String,
}

impl AdjudicationOpinion {
    /// Opinion used when adjudication is off
    pub fn neutral() -> Self {
        Self {
            available: false,
            coherent: false,
            severity: OpinionSeverity::Attention,
            confidence: 0.0,
            reasons: Vec::new(),
            raw: String::new(),
        }
    }

    /// Degraded opinion after a failure
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self {
            reasons: vec![format!("ADJUDICATION_UNAVAILABLE: {}", reason)],
            ..Self::neutral()
        }
    }

    /// The opinion alone is enough to send the item to review
    pub fn demands_review(&self) -> bool {
        self.severity == OpinionSeverity::Incoherent
            || (!self.coherent && self.confidence >= REVIEW_CONFIDENCE)
    }
}

/// Candidate code with its catalogue description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCode {
    /// CFOP
    pub cfop: String,
    /// Catalogue description, possibly empty
    pub description: String,
}

/// Everything the adjudicator sees about one item
#[derive(Debug, Clone, Serialize)]
pub struct AdjudicationContext<'a> {
    /// Issuer state
    pub issuer_state: &'a str,
    /// Recipient state
    pub recipient_state: &'a str,
    /// Issuer regime code
    pub issuer_regime: &'a str,
    /// Item under review
    pub item: &'a CoherenceItem,
    /// Candidate codes
    pub candidates: Vec<CandidateCode>,
}

impl AdjudicationContext<'_> {
    /// Prompt sent to the text-generation endpoint
    pub fn prompt(&self) -> String {
        let context = json!({
            "issuer_state": self.issuer_state,
            "recipient_state": self.recipient_state,
            "issuer_regime": self.issuer_regime,
            "item": {
                "description": self.item.description,
                "ncm": self.item.ncm,
                "informed_cfop": self.item.cfop,
                "icms": self.item.icms,
            },
            "candidates": self.candidates,
            "output": {
                "coherent": "bool",
                "severity": "COHERENT|ATTENTION|INCOHERENT",
                "confidence": "0..1",
                "reasons": "[str]",
            },
        });
        format!(
            "You are a TAX AUDITOR. Analyse the JSON and decide whether the informed CFOP is COHERENT with the product.\n\
             Answer ONLY with a one-line JSON:\n\
             {{\"coherent\":true|false,\"severity\":\"COHERENT|ATTENTION|INCOHERENT\",\"confidence\":0.0,\"reasons\":[\"...\"]}}\n\n\
             {}\n\nJSON:\n{}",
            RULE_PREAMBLE, context
        )
    }
}

/// Source of a second opinion on an item
#[async_trait]
pub trait Adjudicator: Send + Sync {
    /// Produce an opinion; failures degrade to [`AdjudicationOpinion::unavailable`]
    async fn adjudicate(&self, context: &AdjudicationContext<'_>) -> AdjudicationOpinion;
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default, alias = "coerente")]
    coherent: Option<bool>,
    #[serde(default, alias = "gravidade")]
    severity: Option<String>,
    #[serde(default, alias = "conf")]
    confidence: Option<f64>,
    #[serde(default, alias = "motivos")]
    reasons: Vec<String>,
}

fn excerpt(text: &str) -> String {
    text.chars().take(RAW_EXCERPT_CHARS).collect()
}

/// Parse generated text into an opinion
///
/// The first `{` through the last `}` is read as JSON.
pub fn parse_reply(text: &str) -> Result<AdjudicationOpinion> {
    let object = JSON_OBJECT
        .find(text)
        .map(|m| m.as_str())
        .unwrap_or(text);
    let reply: Reply = serde_json::from_str(object)
        .map_err(|e| Error::AdjudicationUnavailable(format!("Unparseable reply: {}", e)))?;

    Ok(AdjudicationOpinion {
        available: true,
        coherent: reply.coherent.unwrap_or(false),
        severity: reply
            .severity
            .as_deref()
            .map(OpinionSeverity::parse)
            .unwrap_or(OpinionSeverity::Attention),
        confidence: reply.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
        reasons: reply.reasons,
        raw: excerpt(text),
    })
}

/// Generated text from a text-generation response body
fn generated_text(body: &Value) -> String {
    let text = match body {
        Value::Array(items) => items.first().and_then(|i| i.get("generated_text")),
        Value::Object(_) => body.get("generated_text"),
        _ => None,
    };
    match text.and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => body.to_string(),
    }
}

/// Adjudicator backed by a remote text-generation endpoint
pub struct RemoteAdjudicator {
    config: AdjudicatorConfig,
    http_client: Client,
}

impl RemoteAdjudicator {
    /// Create a client bounded by the configured timeout
    pub fn new(config: AdjudicatorConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.config.initial_backoff_ms.saturating_mul(1u64 << attempt.min(16)))
    }

    /// Call the endpoint, retrying while the model is loading
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        if !self.config.is_available() {
            return Err(Error::AdjudicationUnavailable(
                "No adjudication token or endpoint configured".to_string(),
            ));
        }

        let endpoint = self.config.resolved_endpoint();
        let payload = json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": self.config.max_new_tokens,
                "temperature": self.config.temperature,
                "return_full_text": false,
            },
        });

        let attempts = self.config.max_attempts.max(1);
        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.backoff(attempt - 1);
                warn!(
                    "Model loading, retry {}/{} after {:?}",
                    attempt + 1,
                    attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .http_client
                .post(&endpoint)
                .header("Authorization", format!("Bearer {}", self.config.api_token))
                .header("Content-Type", "application/json")
                .json(&payload)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            if status == StatusCode::SERVICE_UNAVAILABLE && body.to_lowercase().contains("loading") {
                debug!("Adjudication endpoint loading: {}", excerpt(&body));
                continue;
            }

            if !status.is_success() {
                return Err(Error::AdjudicationUnavailable(format!(
                    "Endpoint returned {}: {}",
                    status,
                    excerpt(&body)
                )));
            }

            let value: Value = serde_json::from_str(&body).unwrap_or(Value::String(body));
            return Ok(match value {
                Value::String(text) => text,
                other => generated_text(&other),
            });
        }

        Err(Error::AdjudicationUnavailable(format!(
            "Model still loading after {} attempts",
            attempts
        )))
    }
}

#[async_trait]
impl Adjudicator for RemoteAdjudicator {
    async fn adjudicate(&self, context: &AdjudicationContext<'_>) -> AdjudicationOpinion {
        let reply = match self.generate(&context.prompt()).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Adjudication failed for CFOP {}: {}", context.item.cfop, e);
                return AdjudicationOpinion::unavailable(e);
            }
        };

        match parse_reply(&reply) {
            Ok(opinion) => {
                debug!(
                    "Adjudication for CFOP {}: {:?} ({:.2})",
                    context.item.cfop, opinion.severity, opinion.confidence
                );
                opinion
            }
            Err(e) => {
                info!("Degrading adjudication for CFOP {}: {}", context.item.cfop, e);
                AdjudicationOpinion {
                    raw: excerpt(&reply),
                    ..AdjudicationOpinion::unavailable(e)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_surrounding_text() {
        let text = "Sure. {\"coherent\": false, \"severity\": \"INCOHERENT\", \"confidence\": 0.9, \"reasons\": [\"not an asset\"]} done";
        let opinion = parse_reply(text).unwrap();
        assert!(opinion.available);
        assert!(!opinion.coherent);
        assert_eq!(opinion.severity, OpinionSeverity::Incoherent);
        assert_eq!(opinion.reasons, vec!["not an asset".to_string()]);
        assert!(opinion.demands_review());
    }

    #[test]
    fn test_parse_reply_aliases() {
        let text = "{\"coerente\":true,\"gravidade\":\"COERENTE\",\"conf\":0.75,\"motivos\":[]}";
        let opinion = parse_reply(text).unwrap();
        assert!(opinion.coherent);
        assert_eq!(opinion.severity, OpinionSeverity::Coherent);
        assert!(!opinion.demands_review());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let opinion = parse_reply("{\"coherent\":false,\"confidence\":7}").unwrap();
        assert_eq!(opinion.confidence, 1.0);
        assert_eq!(opinion.severity, OpinionSeverity::Attention);
    }

    #[test]
    fn test_unparseable_reply() {
        assert!(matches!(
            parse_reply("I cannot decide"),
            Err(Error::AdjudicationUnavailable(_))
        ));
    }

    #[test]
    fn test_unavailable_is_neutral() {
        let opinion = AdjudicationOpinion::unavailable("timeout");
        assert_eq!(opinion.severity, OpinionSeverity::Attention);
        assert_eq!(opinion.confidence, 0.0);
        assert!(!opinion.demands_review());
        assert!(opinion.reasons[0].contains("timeout"));
    }

    #[test]
    fn test_generated_text_shapes() {
        assert_eq!(generated_text(&json!([{"generated_text": "a"}])), "a");
        assert_eq!(generated_text(&json!({"generated_text": "b"})), "b");
        assert_eq!(generated_text(&json!({"other": 1})), "{\"other\":1}");
    }

    #[test]
    fn test_prompt_lists_candidates() {
        let item = CoherenceItem {
            description: "Notebook".to_string(),
            cfop: "5551".to_string(),
            ..Default::default()
        };
        let context = AdjudicationContext {
            issuer_state: "SP",
            recipient_state: "SP",
            issuer_regime: "3",
            item: &item,
            candidates: vec![CandidateCode {
                cfop: "5551".to_string(),
                description: "Venda de bem do ativo imobilizado (interna)".to_string(),
            }],
        };
        let prompt = context.prompt();
        assert!(prompt.contains("x551 (fixed asset)"));
        assert!(prompt.contains("\"informed_cfop\":\"5551\""));
    }

    #[test]
    fn test_backoff_doubles() {
        let adjudicator = RemoteAdjudicator::new(AdjudicatorConfig {
            initial_backoff_ms: 100,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(adjudicator.backoff(0), Duration::from_millis(100));
        assert_eq!(adjudicator.backoff(1), Duration::from_millis(200));
        assert_eq!(adjudicator.backoff(2), Duration::from_millis(400));
    }
}
