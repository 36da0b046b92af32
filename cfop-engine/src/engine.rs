//! Coherence engine
//!
//! Every item is assessed independently. The local stages are synchronous;
//! only the optional adjudication awaits, and items are adjudicated
//! concurrently.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adjudicator::{AdjudicationContext, AdjudicationOpinion, Adjudicator, CandidateCode, RemoteAdjudicator};
use crate::candidates;
use crate::catalogue::{self, CfopCatalogue};
use crate::classify;
use crate::config::AdjudicatorConfig;
use crate::consensus::{self, Consensus};
use crate::heuristics;
use crate::nature::TradeDirection;
use crate::rules;
use crate::st;
use crate::terms::normalize;
use crate::types::{
    Action, Badge, CoherenceItem, CoherenceRequest, CoherenceResponse, CoherenceVerdict,
    HeuristicSignal, RuleFinding,
};
use crate::Result;

/// Local stages of one item, before consensus
struct Assessment<'a> {
    item: &'a CoherenceItem,
    cfop: String,
    description: String,
    direction: TradeDirection,
    findings: Vec<RuleFinding>,
    heuristic: HeuristicSignal,
    candidates: Vec<String>,
}

/// CFOP coherence engine
pub struct CoherenceEngine {
    catalogue: Arc<CfopCatalogue>,
    adjudicator: Option<Arc<dyn Adjudicator>>,
    adjudicate_by_default: bool,
}

impl CoherenceEngine {
    /// Create an engine; a remote adjudicator is attached when one is configured
    pub fn new(config: &AdjudicatorConfig) -> Result<Self> {
        let adjudicator: Option<Arc<dyn Adjudicator>> = if config.is_available() {
            Some(Arc::new(RemoteAdjudicator::new(config.clone())?))
        } else {
            if config.enabled {
                warn!("Adjudication enabled but no token configured, running local rules only");
            }
            None
        };

        Ok(Self {
            catalogue: catalogue::shared_builtin(),
            adjudicator,
            adjudicate_by_default: config.is_active(),
        })
    }

    /// Engine without adjudication
    pub fn local() -> Self {
        Self {
            catalogue: catalogue::shared_builtin(),
            adjudicator: None,
            adjudicate_by_default: false,
        }
    }

    /// Use a specific catalogue
    pub fn with_catalogue(mut self, catalogue: Arc<CfopCatalogue>) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// Use a specific adjudicator
    pub fn with_adjudicator(mut self, adjudicator: Arc<dyn Adjudicator>, by_default: bool) -> Self {
        self.adjudicator = Some(adjudicator);
        self.adjudicate_by_default = by_default;
        self
    }

    /// Catalogue in use
    pub fn catalogue(&self) -> &CfopCatalogue {
        &self.catalogue
    }

    /// Whether a request would be adjudicated
    pub fn adjudicates(&self, request: &CoherenceRequest) -> bool {
        self.adjudicator.is_some() && request.adjudicate.unwrap_or(self.adjudicate_by_default)
    }

    /// Evaluate with local stages only, whatever the request asks
    pub fn evaluate_local(&self, request: &CoherenceRequest) -> CoherenceResponse {
        let items = request
            .items
            .iter()
            .map(|item| self.conclude(self.assess(request, item), None))
            .collect();
        respond(request, false, items)
    }

    /// Evaluate a request, adjudicating items concurrently when enabled
    pub async fn evaluate(&self, request: &CoherenceRequest) -> CoherenceResponse {
        if request.items.is_empty() {
            warn!("Coherence request without items");
            return respond(request, false, Vec::new());
        }

        let adjudicator = match &self.adjudicator {
            Some(adjudicator) if self.adjudicates(request) => adjudicator.clone(),
            _ => return self.evaluate_local(request),
        };

        let assessments: Vec<Assessment<'_>> = request
            .items
            .iter()
            .map(|item| self.assess(request, item))
            .collect();

        let contexts: Vec<AdjudicationContext<'_>> = assessments
            .iter()
            .map(|assessment| AdjudicationContext {
                issuer_state: request.issuer_state.trim(),
                recipient_state: request.recipient_state.trim(),
                issuer_regime: request.issuer_regime.trim(),
                item: assessment.item,
                candidates: self.describe(&assessment.candidates),
            })
            .collect();

        let opinions = join_all(contexts.iter().map(|context| adjudicator.adjudicate(context))).await;

        let items = assessments
            .into_iter()
            .zip(opinions)
            .map(|(assessment, opinion)| self.conclude(assessment, Some(&opinion)))
            .collect();
        respond(request, true, items)
    }

    fn describe(&self, codes: &[String]) -> Vec<CandidateCode> {
        codes
            .iter()
            .map(|code| CandidateCode {
                cfop: code.clone(),
                description: self.catalogue.description(code).to_string(),
            })
            .collect()
    }

    fn assess<'a>(&self, request: &CoherenceRequest, item: &'a CoherenceItem) -> Assessment<'a> {
        let issuer = request.issuer_state.trim();
        let recipient = request.recipient_state.trim();
        let cfop = item.cfop.trim().to_string();
        let ncm = item.ncm.trim();
        let description = normalize(&item.description);
        let direction = TradeDirection::between(issuer, recipient);

        let mut findings = rules::structural_findings(&cfop, &description);
        findings.extend(rules::nature_finding(issuer, recipient, &cfop));
        findings.extend(st::evaluate(&cfop, &item.icms));

        let heuristic = heuristics::evaluate(issuer, recipient, &description, ncm, &cfop);
        let candidates = candidates::build(&self.catalogue, direction, &description, ncm, &cfop);

        debug!(
            "Item {:?} CFOP {}: {} findings, heuristic coherent={}",
            item.number,
            cfop,
            findings.len(),
            heuristic.coherent
        );

        Assessment {
            item,
            cfop,
            description,
            direction,
            findings,
            heuristic,
            candidates,
        }
    }

    fn conclude(&self, assessment: Assessment<'_>, opinion: Option<&AdjudicationOpinion>) -> CoherenceVerdict {
        let Assessment {
            item,
            cfop,
            description,
            direction,
            findings,
            heuristic,
            candidates,
        } = assessment;

        let Consensus {
            decision,
            suggested_cfop,
        } = consensus::decide(&findings, heuristic, opinion, direction, &description);

        if decision.action != Action::Keep {
            info!(
                "Item {:?} CFOP {} -> {:?} ({})",
                item.number,
                cfop,
                decision.action,
                decision.reasons.first().map(String::as_str).unwrap_or("")
            );
        }

        CoherenceVerdict {
            number: item.number,
            description: item.description.clone(),
            ncm: item.ncm.trim().to_string(),
            cfop_description: self.catalogue.description(&cfop).to_string(),
            informed_cfop: cfop.clone(),
            chosen_cfop: cfop,
            suggested_cfop,
            candidates,
            decision,
            badge: Badge::from_findings(&findings),
            score: consensus::item_score(&findings),
            findings,
        }
    }
}

fn respond(request: &CoherenceRequest, adjudicated: bool, items: Vec<CoherenceVerdict>) -> CoherenceResponse {
    CoherenceResponse {
        adjudicated,
        score: items.iter().map(|item| item.score).sum(),
        items,
        classification: classify::classify(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::OperationKind;

    fn request(recipient: &str, items: Vec<(&str, &str, &str)>) -> CoherenceRequest {
        CoherenceRequest {
            issuer_state: "SP".to_string(),
            recipient_state: recipient.to_string(),
            issuer_regime: "3".to_string(),
            operation_type: "1".to_string(),
            sector: None,
            items: items
                .into_iter()
                .enumerate()
                .map(|(i, (description, cfop, ncm))| CoherenceItem {
                    number: Some(i as u32 + 1),
                    description: description.to_string(),
                    cfop: cfop.to_string(),
                    ncm: ncm.to_string(),
                    ..Default::default()
                })
                .collect(),
            adjudicate: None,
        }
    }

    #[test]
    fn test_blocks_implausible_asset() {
        let engine = CoherenceEngine::local();
        let response = engine.evaluate_local(&request("SP", vec![("Parafuso sextavado", "5551", "73181500")]));
        let verdict = &response.items[0];
        assert_eq!(verdict.decision.action, Action::Block);
        assert_eq!(verdict.suggested_cfop.as_deref(), Some("5101"));
        assert_eq!(verdict.badge, Badge::Incoherent);
        assert_eq!(verdict.chosen_cfop, "5551");
        assert_eq!(verdict.score, 40);
        assert_eq!(response.score, 40);
        assert!(!response.adjudicated);
    }

    #[test]
    fn test_keeps_plausible_asset() {
        let engine = CoherenceEngine::local();
        let response = engine.evaluate_local(&request("SP", vec![("Notebook Dell", "5551", "84713012")]));
        let verdict = &response.items[0];
        assert!(verdict.findings.is_empty());
        assert_eq!(verdict.decision.action, Action::Keep);
        assert_eq!(verdict.badge, Badge::Coherent);
        assert_eq!(verdict.candidates[0], "5551");
    }

    #[test]
    fn test_interstate_code_required() {
        let engine = CoherenceEngine::local();
        let response = engine.evaluate_local(&request("RJ", vec![("Notebook Dell", "5551", "84713012")]));
        let verdict = &response.items[0];
        assert_eq!(verdict.findings[0].rule, rules::NATURE_MISMATCH);
        assert_eq!(verdict.decision.action, Action::Block);
        assert_eq!(verdict.suggested_cfop.as_deref(), Some("6551"));
    }

    #[test]
    fn test_without_adjudicator_requests_run_locally() {
        let engine = CoherenceEngine::local();
        let mut req = request("SP", vec![("Venda de mercadoria", "5102", "")]);
        req.adjudicate = Some(true);
        assert!(!engine.adjudicates(&req));
    }

    #[tokio::test]
    async fn test_empty_request() {
        let engine = CoherenceEngine::local();
        let response = engine.evaluate(&request("SP", vec![])).await;
        assert!(response.items.is_empty());
        assert_eq!(response.score, 0);
        assert_eq!(response.classification.kind, OperationKind::Unknown);
    }

    #[test]
    fn test_response_carries_classification() {
        let engine = CoherenceEngine::local();
        let response = engine.evaluate_local(&request("SP", vec![("Notebook Dell", "5551", "84713012")]));
        assert_eq!(response.classification.kind, OperationKind::Sale);
        assert_eq!(response.classification.chapter, Some(84));
        assert!(response.classification.cost_centers.contains(&"IT".to_string()));
    }
}
