//! Consensus between hard rules, heuristics and the adjudicator
//!
//! Precedence is fixed: a critical finding blocks, a confident negative
//! opinion sends the item to review, a coherent heuristic keeps it, and
//! anything else is reviewed as a weak signal.

use crate::adjudicator::AdjudicationOpinion;
use crate::nature::TradeDirection;
use crate::rules;
use crate::types::{Action, AdjudicationTrace, Decision, HeuristicSignal, RuleFinding};

/// Characters of the raw adjudicator reply kept in the decision trace
const TRACE_EXCERPT_CHARS: usize = 240;

/// Outcome of the consensus for one item
#[derive(Debug, Clone, PartialEq)]
pub struct Consensus {
    /// Decision
    pub decision: Decision,
    /// Replacement CFOP, set only when blocking
    pub suggested_cfop: Option<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fuse the signals into one decision
///
/// `description` must already be normalized.
pub fn decide(
    findings: &[RuleFinding],
    heuristic: HeuristicSignal,
    opinion: Option<&AdjudicationOpinion>,
    direction: TradeDirection,
    description: &str,
) -> Consensus {
    let mut reasons = Vec::new();
    let mut suggested_cfop = None;

    let action = if findings.iter().any(RuleFinding::is_critical) {
        suggested_cfop = Some(rules::suggest_replacement(direction, description));
        reasons.push("Hard rules: severe conflict".to_string());
        reasons.extend(
            findings
                .iter()
                .filter(|f| f.is_critical())
                .map(|f| format!("{}: {}", f.rule, f.message)),
        );
        Action::Block
    } else if let Some(opinion) = opinion.filter(|o| o.demands_review()) {
        reasons.push("Adjudicator reports incoherence with moderate confidence".to_string());
        reasons.extend(opinion.reasons.iter().cloned());
        Action::Review
    } else if heuristic.coherent {
        reasons.push("Heuristic: coherent and nature ok".to_string());
        Action::Keep
    } else {
        reasons.push("Weak/ambiguous signals: attention".to_string());
        if let Some(opinion) = opinion.filter(|o| !o.available) {
            reasons.extend(opinion.reasons.iter().cloned());
        }
        Action::Review
    };

    let adjudication = match opinion {
        Some(opinion) => AdjudicationTrace {
            used: true,
            raw_excerpt: opinion.raw.chars().take(TRACE_EXCERPT_CHARS).collect(),
        },
        None => AdjudicationTrace::default(),
    };

    Consensus {
        decision: Decision {
            action,
            confidence: round2(opinion.map_or(0.0, |o| o.confidence)),
            reasons,
            heuristic,
            adjudication,
        },
        suggested_cfop,
    }
}

/// Sum of finding weights
pub fn item_score(findings: &[RuleFinding]) -> u32 {
    findings.iter().map(|f| f.severity.weight()).sum()
}
