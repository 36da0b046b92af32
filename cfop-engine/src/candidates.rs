//! Candidate CFOP generation

use crate::catalogue::CfopCatalogue;
use crate::heuristics;
use crate::nature::TradeDirection;

/// Maximum number of candidates, informed code included
pub const MAX_CANDIDATES: usize = 25;

/// Ranked, deduplicated candidate codes with the informed code first
///
/// The base list is every catalogue code of the trade-direction family.
/// When keyword or tariff suggestions fall inside it, only those are kept.
pub fn build(
    catalogue: &CfopCatalogue,
    direction: TradeDirection,
    description: &str,
    ncm: &str,
    informed: &str,
) -> Vec<String> {
    let family = direction.family();
    let base: Vec<&str> = catalogue
        .codes()
        .filter(|code| code.starts_with(family))
        .collect();

    let suggested: Vec<&str> = heuristics::suggestions(description, ncm)
        .into_iter()
        .filter(|code| base.contains(code))
        .collect();
    let ranked = if suggested.is_empty() { base } else { suggested };

    let informed = informed.trim();
    let mut candidates: Vec<String> = Vec::with_capacity(MAX_CANDIDATES);
    if !informed.is_empty() {
        candidates.push(informed.to_string());
    }
    for code in ranked {
        if candidates.len() >= MAX_CANDIDATES {
            break;
        }
        if !candidates.iter().any(|c| c == code) {
            candidates.push(code.to_string());
        }
    }
    candidates
}
