//! Document classification
//!
//! Operation kind from the CFOP family, cost centers and a macro sector from
//! description keywords and NCM chapters, and per-sector CFOP policies. The
//! outcome is advisory: it never changes an item decision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use tracing::debug;

use crate::terms::{self, contains_any, normalize};
use crate::types::{CoherenceItem, CoherenceRequest, RuleFinding};

/// Agribusiness item with a CFOP outside the usual set
pub const AGRO_CFOP_ATYPICAL: &str = "AGRO_CFOP_ATYPICAL";
/// Automotive service billed with a goods CFOP
pub const AUTO_SERVICE_WITH_GOODS_CFOP: &str = "AUTO_SERVICE_WITH_GOODS_CFOP";
/// Industrial input billed as an ordinary sale
pub const IND_INPUT_COMMON_SALE: &str = "IND_INPUT_COMMON_SALE";

/// Cost center when nothing matches
pub const GENERAL: &str = "General";
/// Cost center for service items outside every family
pub const GENERAL_SERVICES: &str = "General services";

const IT: &[&str] = &[
    "servidor", "notebook", "desktop", "teclado", "mouse", "roteador", "switch", "ssd", "hd",
    "fonte", "placa-mãe", "gpu", "memória", "licença", "software", "antivírus", "firewall",
];
const WORKSHOP: &[&str] = &[
    "óleo", "pneu", "amortecedor", "pastilha", "disco de freio", "correia", "filtro", "bomba",
    "embreagem", "diagnóstico", "alinhamento", "balanceamento", "mão de obra",
];
const CLEANING: &[&str] = &[
    "detergente", "desinfetante", "álcool", "papel toalha", "sabonete", "esponja", "saco de lixo",
];
const OFFICE: &[&str] = &["papel", "caneta", "grampeador", "post-it", "toner", "cartucho"];
const PRODUCTION: &[&str] = &[
    "matéria-prima", "insumo", "bobina", "resina", "granulado", "lingote", "pigmento", "chapas",
    "lote químico", "produto intermediário",
];
const AGRO: &[&str] = &[
    "sementes", "adubo", "fertilizante", "defensivo", "calcário", "ração", "agro",
];

/// Keyword family and NCM chapters per cost center, first match wins
const COST_CENTERS: &[(&str, &[&str], &[u8])] = &[
    ("IT", IT, &[84, 85]),
    ("Workshop", WORKSHOP, &[87]),
    ("Cleaning", CLEANING, &[34]),
    ("Office", OFFICE, &[48]),
    ("Production", PRODUCTION, &[72, 39, 29]),
    ("Agro", AGRO, &[31]),
];

/// Macro sector of a chapter range and the cost centers it suggests
struct MacroSector {
    chapters: RangeInclusive<u8>,
    name: &'static str,
    cost_centers: &'static [&'static str],
}

const MACRO_SECTORS: &[MacroSector] = &[
    MacroSector { chapters: 1..=5, name: "agribusiness_animal", cost_centers: &["Agro"] },
    MacroSector { chapters: 6..=14, name: "agribusiness_vegetable", cost_centers: &["Agro"] },
    MacroSector { chapters: 15..=15, name: "oils_fats", cost_centers: &["Food"] },
    MacroSector { chapters: 16..=24, name: "food_beverages_tobacco", cost_centers: &["Food"] },
    MacroSector { chapters: 25..=27, name: "minerals_energy", cost_centers: &["Energy"] },
    MacroSector { chapters: 28..=38, name: "chemicals_pharma", cost_centers: &["R&D", "Quality"] },
    MacroSector { chapters: 39..=40, name: "plastics_rubber", cost_centers: &["Production"] },
    MacroSector { chapters: 41..=43, name: "leather_fashion", cost_centers: &["Fashion"] },
    MacroSector { chapters: 44..=46, name: "wood_cork", cost_centers: &[] },
    MacroSector { chapters: 47..=49, name: "paper_printing", cost_centers: &["Printing"] },
    MacroSector { chapters: 50..=63, name: "textiles_apparel", cost_centers: &["Fashion"] },
    MacroSector { chapters: 64..=67, name: "footwear_accessories", cost_centers: &["Fashion"] },
    MacroSector { chapters: 68..=70, name: "construction_ceramics_glass", cost_centers: &["Works", "Maintenance"] },
    MacroSector { chapters: 71..=71, name: "jewellery_precious_stones", cost_centers: &["Assets"] },
    MacroSector { chapters: 72..=83, name: "metals_fabrication", cost_centers: &["Maintenance", "Production"] },
    MacroSector { chapters: 84..=85, name: "machinery_electronics", cost_centers: &["IT", "Engineering"] },
    MacroSector { chapters: 86..=89, name: "transport", cost_centers: &["Logistics"] },
    MacroSector { chapters: 90..=92, name: "instruments_health", cost_centers: &["R&D", "Health"] },
    MacroSector { chapters: 93..=93, name: "arms_ammunition", cost_centers: &["Compliance"] },
    MacroSector { chapters: 94..=96, name: "miscellaneous_furniture_toys", cost_centers: &["Administration"] },
    MacroSector { chapters: 97..=97, name: "art_antiques", cost_centers: &["Assets"] },
];

const AGRO_ITEMS: &[&str] = &["sement", "fertiliz", "defensiv"];
const AGRO_CFOPS: &[&str] = &["5101", "5102", "6101", "6102", "1551", "2551", "5551", "6551"];
const AUTO_SERVICES: &[&str] = &["alinhamento", "balanceamento", "mão de obra", "diagnóstico"];
const INDUSTRIAL_INPUTS: &[&str] = &[
    "matéria-prima", "materia-prima", "insumo", "granulado", "resina", "bobina", "pigmento",
    "chapas", "lote químico",
];
const COMMON_SALES: &[&str] = &["5101", "5102", "6101", "6102"];

/// What kind of operation a document records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Inbound goods
    Purchase,
    /// Outbound goods
    Sale,
    /// Service provision
    Service,
    /// Outbound to the exterior
    Export,
    /// Nothing conclusive
    #[default]
    Unknown,
}

impl OperationKind {
    /// Kind implied by the CFOP family; `x30x` outbound codes are services
    pub fn from_cfop(cfop: &str) -> Self {
        let cfop = cfop.trim();
        match cfop.chars().next() {
            Some('1' | '2' | '3') => OperationKind::Purchase,
            Some('5' | '6') if cfop.get(1..3) == Some("30") => OperationKind::Service,
            Some('5' | '6') => OperationKind::Sale,
            Some('7') => OperationKind::Export,
            _ => OperationKind::Unknown,
        }
    }

    /// Fallback from `tpNF` and a normalized description
    pub fn from_context(operation_type: &str, description: &str) -> Self {
        if contains_any(description, terms::SERVICE) {
            return OperationKind::Service;
        }
        match operation_type.trim() {
            "0" => OperationKind::Purchase,
            "1" => OperationKind::Sale,
            _ => OperationKind::Unknown,
        }
    }
}

/// Sector whose CFOP policy applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicySector {
    /// Seeds, fertilizers and pesticides
    Agribusiness,
    /// Vehicle parts and workshop services
    Automotive,
    /// Manufacturing inputs
    Industry,
}

impl PolicySector {
    /// Sector implied by an NCM chapter, when one has a policy
    pub fn for_chapter(chapter: u8) -> Option<Self> {
        match chapter {
            1..=14 => Some(PolicySector::Agribusiness),
            87 => Some(PolicySector::Automotive),
            _ => None,
        }
    }

    /// Findings of this policy for one item; `description` must be normalized
    pub fn check(&self, item: &CoherenceItem, description: &str) -> Option<RuleFinding> {
        let cfop = item.cfop.trim();
        let prefix = item
            .number
            .map(|n| format!("Item {}: ", n))
            .unwrap_or_default();

        match self {
            PolicySector::Agribusiness => (contains_any(description, AGRO_ITEMS)
                && !cfop.is_empty()
                && !AGRO_CFOPS.contains(&cfop))
            .then(|| {
                RuleFinding::warning(
                    AGRO_CFOP_ATYPICAL,
                    &format!("{}CFOP {} outside the usual agribusiness set", prefix, cfop),
                )
            }),
            PolicySector::Automotive => (contains_any(description, AUTO_SERVICES)
                && matches!(cfop.get(..2), Some("51" | "61")))
            .then(|| {
                RuleFinding::critical(
                    AUTO_SERVICE_WITH_GOODS_CFOP,
                    &format!("{}automotive service with goods CFOP {}; use 53xx/63xx", prefix, cfop),
                )
            }),
            PolicySector::Industry => (contains_any(description, INDUSTRIAL_INPUTS)
                && COMMON_SALES.contains(&cfop))
            .then(|| {
                RuleFinding::warning(
                    IND_INPUT_COMMON_SALE,
                    &format!(
                        "{}looks like an industrial input; check an industrialization CFOP (x501/x124/x125) instead of {}",
                        prefix, cfop
                    ),
                )
            }),
        }
    }
}

/// Classification of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Operation kind
    pub kind: OperationKind,
    /// Suggested cost centers, sorted
    pub cost_centers: Vec<String>,
    /// Macro sector of the dominant NCM chapter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Policy applied to the items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicySector>,
    /// Policy findings
    #[serde(default)]
    pub sector_findings: Vec<RuleFinding>,
    /// Chapter of the dominant NCM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u8>,
    /// Most frequent NCM among the items
    #[serde(default)]
    pub dominant_ncm: String,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            kind: OperationKind::Unknown,
            cost_centers: vec![GENERAL.to_string()],
            sector: None,
            policy: None,
            sector_findings: Vec::new(),
            chapter: None,
            dominant_ncm: String::new(),
        }
    }
}

fn only_digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Chapter (1..=97) of an NCM code
pub fn chapter(ncm: &str) -> Option<u8> {
    only_digits(ncm)
        .get(..2)
        .and_then(|c| c.parse::<u8>().ok())
        .filter(|c| (1..=97).contains(c))
}

fn macro_sector(chapter: u8) -> Option<&'static MacroSector> {
    MACRO_SECTORS.iter().find(|s| s.chapters.contains(&chapter))
}

/// Most frequent NCM with at least two digits; the first one seen wins ties
pub fn dominant_ncm(items: &[CoherenceItem]) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for ncm in items.iter().map(|i| only_digits(&i.ncm)).filter(|n| n.len() >= 2) {
        match counts.iter_mut().find(|(seen, _)| *seen == ncm) {
            Some((_, count)) => *count += 1,
            None => counts.push((ncm, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (ncm, count) in counts {
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((ncm, count));
        }
    }
    match best {
        Some((ncm, _)) => ncm,
        None => items.first().map(|i| only_digits(&i.ncm)).unwrap_or_default(),
    }
}

/// Cost center of one item; `description` must be normalized
pub fn cost_center(description: &str, ncm: &str) -> &'static str {
    let item_chapter = chapter(ncm);
    COST_CENTERS
        .iter()
        .find(|(_, keywords, chapters)| {
            contains_any(description, keywords) || item_chapter.map_or(false, |c| chapters.contains(&c))
        })
        .map(|(name, _, _)| *name)
        .unwrap_or_else(|| {
            if contains_any(description, terms::SERVICE) {
                GENERAL_SERVICES
            } else {
                GENERAL
            }
        })
}

/// Classify a whole request
pub fn classify(request: &CoherenceRequest) -> Classification {
    if request.items.is_empty() {
        return Classification {
            policy: request.sector,
            ..Default::default()
        };
    }

    let descriptions: Vec<String> = request.items.iter().map(|i| normalize(&i.description)).collect();

    let kind = request
        .items
        .iter()
        .zip(&descriptions)
        .map(|(item, description)| match OperationKind::from_cfop(&item.cfop) {
            OperationKind::Unknown => OperationKind::from_context(&request.operation_type, description),
            kind => kind,
        })
        .find(|kind| *kind != OperationKind::Unknown)
        .unwrap_or_default();

    let dominant_ncm = dominant_ncm(&request.items);
    let chapter = chapter(&dominant_ncm);
    let sector = chapter.and_then(macro_sector);

    let mut cost_centers: BTreeSet<String> = sector
        .map(|s| s.cost_centers.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    for (item, description) in request.items.iter().zip(&descriptions) {
        cost_centers.insert(cost_center(description, &item.ncm).to_string());
    }

    let policy = request.sector.or_else(|| chapter.and_then(PolicySector::for_chapter));
    let sector_findings: Vec<RuleFinding> = match policy {
        Some(policy) => request
            .items
            .iter()
            .zip(&descriptions)
            .filter_map(|(item, description)| policy.check(item, description))
            .collect(),
        None => Vec::new(),
    };

    debug!(
        "Classified as {:?}, sector {:?}, {} policy findings",
        kind,
        sector.map(|s| s.name),
        sector_findings.len()
    );

    Classification {
        kind,
        cost_centers: cost_centers.into_iter().collect(),
        sector: sector.map(|s| s.name.to_string()),
        policy,
        sector_findings,
        chapter,
        dominant_ncm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(number: u32, description: &str, cfop: &str, ncm: &str) -> CoherenceItem {
        CoherenceItem {
            number: Some(number),
            description: description.to_string(),
            cfop: cfop.to_string(),
            ncm: ncm.to_string(),
            ..Default::default()
        }
    }

    fn request(operation_type: &str, items: Vec<CoherenceItem>) -> CoherenceRequest {
        CoherenceRequest {
            issuer_state: "SP".to_string(),
            recipient_state: "SP".to_string(),
            operation_type: operation_type.to_string(),
            items,
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_from_cfop() {
        assert_eq!(OperationKind::from_cfop("1102"), OperationKind::Purchase);
        assert_eq!(OperationKind::from_cfop("2556"), OperationKind::Purchase);
        assert_eq!(OperationKind::from_cfop("5102"), OperationKind::Sale);
        assert_eq!(OperationKind::from_cfop(" 6301 "), OperationKind::Service);
        assert_eq!(OperationKind::from_cfop("5303"), OperationKind::Service);
        assert_eq!(OperationKind::from_cfop("7101"), OperationKind::Export);
        assert_eq!(OperationKind::from_cfop("9999"), OperationKind::Unknown);
        assert_eq!(OperationKind::from_cfop(""), OperationKind::Unknown);
        assert_eq!(OperationKind::from_cfop("5"), OperationKind::Sale);
    }

    #[test]
    fn test_kind_from_context() {
        assert_eq!(
            OperationKind::from_context("1", "serviço de instalação"),
            OperationKind::Service
        );
        assert_eq!(OperationKind::from_context("0", "parafuso"), OperationKind::Purchase);
        assert_eq!(OperationKind::from_context("1", "parafuso"), OperationKind::Sale);
        assert_eq!(OperationKind::from_context("", "parafuso"), OperationKind::Unknown);
    }

    #[test]
    fn test_context_fallback_when_cfop_missing() {
        let classification = classify(&request("0", vec![item(1, "Parafuso", "", "73181500")]));
        assert_eq!(classification.kind, OperationKind::Purchase);

        let classification = classify(&request("", vec![item(1, "Parafuso", "", "")]));
        assert_eq!(classification.kind, OperationKind::Unknown);
    }

    #[test]
    fn test_cost_centers_and_sector() {
        let classification = classify(&request(
            "1",
            vec![
                item(1, "Monitor LED 24", "5102", "85285200"),
                item(2, "Cabo HDMI", "5102", "85444200"),
                item(3, "Detergente neutro", "5102", "34022000"),
            ],
        ));
        assert_eq!(classification.kind, OperationKind::Sale);
        assert_eq!(classification.dominant_ncm, "85285200");
        assert_eq!(classification.chapter, Some(85));
        assert_eq!(classification.sector.as_deref(), Some("machinery_electronics"));
        assert_eq!(classification.cost_centers, vec!["Cleaning", "Engineering", "IT"]);
        assert!(classification.policy.is_none());
        assert!(classification.sector_findings.is_empty());
    }

    #[test]
    fn test_item_cost_center() {
        assert_eq!(cost_center("caneta azul", ""), "Office");
        assert_eq!(cost_center("papel toalha", ""), "Cleaning");
        assert_eq!(cost_center("pneu aro 15", ""), "Workshop");
        assert_eq!(cost_center("peça sem nome", "87089990"), "Workshop");
        assert_eq!(cost_center("consultoria tributária", ""), GENERAL_SERVICES);
        assert_eq!(cost_center("cadeira", "94013000"), GENERAL);
    }

    #[test]
    fn test_most_frequent_ncm_wins() {
        let items = vec![
            item(1, "a", "5102", "73181500"),
            item(2, "b", "5102", "8471.30.12"),
            item(3, "c", "5102", "84713012"),
        ];
        assert_eq!(dominant_ncm(&items), "84713012");
        assert_eq!(dominant_ncm(&[item(1, "a", "5102", "7")]), "7");
        assert_eq!(dominant_ncm(&[]), "");
    }

    #[test]
    fn test_agribusiness_policy_from_chapter() {
        let classification = classify(&request(
            "1",
            vec![
                item(1, "Sementes de soja", "5949", "12019000"),
                item(2, "Sementes de milho", "5102", "10059010"),
            ],
        ));
        assert_eq!(classification.policy, Some(PolicySector::Agribusiness));
        assert_eq!(classification.sector.as_deref(), Some("agribusiness_vegetable"));
        assert_eq!(classification.sector_findings.len(), 1);
        let finding = &classification.sector_findings[0];
        assert_eq!(finding.rule, AGRO_CFOP_ATYPICAL);
        assert!(!finding.is_critical());
        assert!(finding.message.starts_with("Item 1: CFOP 5949"));
    }

    #[test]
    fn test_automotive_service_with_goods_cfop() {
        let classification = classify(&request(
            "1",
            vec![
                item(1, "Alinhamento e balanceamento", "5102", ""),
                item(2, "Amortecedor dianteiro", "5102", "87088000"),
            ],
        ));
        assert_eq!(classification.policy, Some(PolicySector::Automotive));
        assert_eq!(classification.sector_findings.len(), 1);
        assert_eq!(classification.sector_findings[0].rule, AUTO_SERVICE_WITH_GOODS_CFOP);
        assert!(classification.sector_findings[0].is_critical());
    }

    #[test]
    fn test_requested_industry_policy() {
        let mut req = request("1", vec![item(1, "Resina PET granulado", "5102", "39076100")]);
        assert!(classify(&req).sector_findings.is_empty());

        req.sector = Some(PolicySector::Industry);
        let classification = classify(&req);
        assert_eq!(classification.sector_findings[0].rule, IND_INPUT_COMMON_SALE);

        req.items[0].cfop = "5501".to_string();
        assert!(classify(&req).sector_findings.is_empty());
    }

    #[test]
    fn test_empty_request() {
        let classification = classify(&request("1", vec![]));
        assert_eq!(classification, Classification::default());
        assert_eq!(classification.cost_centers, vec![GENERAL]);
    }
}
