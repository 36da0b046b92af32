//! Keyword heuristics
//!
//! Free-text keywords map to the CFOP families they usually go with. A code
//! matches a family when it shares the family's first two digits.

use crate::nature;
use crate::terms::{self, contains_any};
use crate::types::HeuristicSignal;

/// Keyword to expected CFOP family, in evaluation order
pub const KEYWORD_FAMILIES: &[(&str, &[&str])] = &[
    ("imobiliz", &["2551", "3551", "5551", "6551"]),
    ("ativo imobil", &["2551", "3551", "5551", "6551"]),
    ("uso e consumo", &["2556", "3556", "5556", "6556"]),
    ("consumo", &["2556", "3556", "5556", "6556"]),
    ("energia", &["5251", "5252", "5253", "5254", "5255", "5256", "5257", "5258"]),
    ("combust", &["2651", "2652", "2653", "3651", "3652", "3653"]),
    ("bonifica", &["2910", "5910", "6910"]),
    ("doaç", &["2910", "5910", "6910"]),
    ("amostra", &["2911", "5911", "6911"]),
    ("demonstra", &["2912", "2913", "5912", "5913", "6912", "6913"]),
    ("devolu", &["5201", "5202", "3201", "3202", "5410", "5411", "2411", "2414", "2415"]),
    ("industrial", &["5101", "6101", "5124", "6124"]),
    ("transfer", &["5151", "5152", "5155", "5156"]),
    ("exporta", &["5501", "5502", "7101", "7102", "7501", "7502"]),
    ("venda", &["5101", "5102", "6101", "6102"]),
    ("servi", &["5301", "5303", "5307", "6301", "6303", "6307", "7301", "7303", "7307"]),
];

/// Asset family hinted by machinery and electronics chapters
const ASSET_FAMILY: &[&str] = &["2551", "3551", "5551", "6551"];

/// Tariff chapters of machinery and electrical equipment
const ASSET_CHAPTERS: [&str; 2] = ["84", "85"];

/// Asset-family hint when the NCM is machinery/electronics and the description looks like an asset
pub fn tariff_hints(ncm: &str, description: &str) -> &'static [&'static str] {
    let chapter = ncm.trim().get(..2).unwrap_or("");
    if ASSET_CHAPTERS.contains(&chapter) && contains_any(description, terms::ASSET) {
        ASSET_FAMILY
    } else {
        &[]
    }
}

/// Codes suggested by the keywords and tariff hint, in table order, possibly repeated
pub fn suggestions(description: &str, ncm: &str) -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = KEYWORD_FAMILIES
        .iter()
        .filter(|(keyword, _)| description.contains(keyword))
        .flat_map(|(_, family)| family.iter().copied())
        .collect();
    codes.extend_from_slice(tariff_hints(ncm, description));
    codes
}

fn family_matches(cfop: &str, family: &[&str]) -> bool {
    family
        .iter()
        .any(|code| cfop == *code || code.get(..2).is_some_and(|prefix| cfop.starts_with(prefix)))
}

/// Evaluate the keyword heuristic for one item
///
/// `description` must already be normalized with [`terms::normalize`].
pub fn evaluate(
    issuer_state: &str,
    recipient_state: &str,
    description: &str,
    ncm: &str,
    cfop: &str,
) -> HeuristicSignal {
    let mut signals = Vec::new();
    let mut matched = false;

    for (keyword, family) in KEYWORD_FAMILIES {
        if !description.contains(keyword) {
            continue;
        }
        if family_matches(cfop, family) {
            matched = true;
            signals.push(format!("ok:{}->{}", keyword, family.join(",")));
        } else {
            signals.push(format!("suggests:{}->{}, cfop={}", keyword, family.join(","), cfop));
        }
    }

    let hints = tariff_hints(ncm, description);
    if !hints.is_empty() {
        if family_matches(cfop, hints) {
            matched = true;
            signals.push(format!("ok:NCM->{}", hints.join(",")));
        } else {
            signals.push(format!("suggests:NCM->{}, cfop={}", hints.join(","), cfop));
        }
    }

    let nature_ok = nature::is_compatible(issuer_state, recipient_state, cfop);
    signals.push(if nature_ok { "nature:ok" } else { "nature:incompatible" }.to_string());

    HeuristicSignal {
        coherent: matched && nature_ok,
        signals,
        nature_ok,
    }
}
