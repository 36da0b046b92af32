//! Coherence engine tests over whole requests

use cfop_engine::rules;
use cfop_engine::{
    Action, Badge, CfopCatalogue, CoherenceEngine, CoherenceItem, CoherenceRequest, IcmsFields,
    Severity,
};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn item(number: u32, description: &str, cfop: &str, ncm: &str) -> CoherenceItem {
    CoherenceItem {
        number: Some(number),
        description: description.to_string(),
        cfop: cfop.to_string(),
        ncm: ncm.to_string(),
        icms: IcmsFields::default(),
    }
}

fn request(issuer: &str, recipient: &str, items: Vec<CoherenceItem>) -> CoherenceRequest {
    CoherenceRequest {
        issuer_state: issuer.to_string(),
        recipient_state: recipient.to_string(),
        issuer_regime: "3".to_string(),
        operation_type: "1".to_string(),
        sector: None,
        items,
        adjudicate: None,
    }
}

#[test]
fn test_nature_follows_state_pair() {
    let engine = CoherenceEngine::local();

    let same_state = engine.evaluate_local(&request("SP", "SP", vec![item(1, "Notebook", "5551", "84713012")]));
    assert!(same_state.items[0]
        .findings
        .iter()
        .all(|f| f.rule != rules::NATURE_MISMATCH));

    let interstate = engine.evaluate_local(&request("SP", "RJ", vec![item(1, "Notebook", "5551", "84713012")]));
    let finding = &interstate.items[0].findings[0];
    assert_eq!(finding.rule, rules::NATURE_MISMATCH);
    assert_eq!(finding.severity, Severity::Critical);

    let export = engine.evaluate_local(&request("SP", "EX", vec![item(1, "Notebook", "7101", "84713012")]));
    assert!(export.items[0]
        .findings
        .iter()
        .all(|f| f.rule != rules::NATURE_MISMATCH));
}

#[test]
fn test_asset_code_with_screw_is_blocked() {
    let engine = CoherenceEngine::local();
    let response = engine.evaluate_local(&request(
        "SP",
        "SP",
        vec![
            item(1, "parafuso", "5551", ""),
            item(2, "notebook", "5551", ""),
        ],
    ));

    let screw = &response.items[0];
    assert_eq!(screw.findings.len(), 1);
    assert_eq!(screw.findings[0].rule, rules::ASSET_IMPLAUSIBLE);
    assert_eq!(screw.decision.action, Action::Block);
    assert_eq!(screw.suggested_cfop.as_deref(), Some("5101"));
    assert_eq!(screw.badge, Badge::Incoherent);

    let notebook = &response.items[1];
    assert!(notebook.findings.is_empty());
    assert_ne!(notebook.decision.action, Action::Block);
    assert!(notebook.suggested_cfop.is_none());
    assert_eq!(notebook.badge, Badge::Coherent);

    assert_eq!(response.score, 40);
}

#[test]
fn test_interstate_suggestion_variant() {
    let engine = CoherenceEngine::local();
    let response = engine.evaluate_local(&request("SP", "MG", vec![item(1, "Parafuso", "6551", "")]));
    assert_eq!(response.items[0].suggested_cfop.as_deref(), Some("6101"));
}

#[test]
fn test_informed_code_always_first() {
    let engine = CoherenceEngine::local();
    let response = engine.evaluate_local(&request(
        "SP",
        "SP",
        vec![
            item(1, "Notebook Dell", "1501", "84713012"),
            item(2, "Amostra de perfume", "5102", ""),
            item(3, "Produto", "", ""),
        ],
    ));
    assert_eq!(response.items[0].candidates[0], "1501");
    assert_eq!(response.items[1].candidates[0], "5102");
    assert!(response.items[1].candidates.contains(&"5911".to_string()));
    assert!(response.items[2].candidates.iter().all(|c| c.starts_with('5')));
}

#[test]
fn test_st_evidence() {
    let engine = CoherenceEngine::local();
    let mut with_evidence = item(1, "Refrigerante lata", "5405", "22021000");
    with_evidence.icms.cst = "60".to_string();
    let mut filled = item(2, "Refrigerante lata", "5405", "22021000");
    filled.icms = IcmsFields {
        cst: "10".to_string(),
        csosn: String::new(),
        st_base: Some(dec!(150.00)),
        st_rate: Some(dec!(18)),
        st_amount: Some(dec!(9.00)),
    };
    let without_evidence = item(3, "Refrigerante lata", "5405", "22021000");

    let response = engine.evaluate_local(&request("SP", "SP", vec![with_evidence, filled, without_evidence]));

    assert_eq!(response.items[0].findings[0].severity, Severity::Critical);
    assert_eq!(response.items[0].decision.action, Action::Block);
    assert!(response.items[1].findings.is_empty());
    assert_eq!(response.items[2].findings[0].severity, Severity::Warning);
    assert_eq!(response.items[2].badge, Badge::Attention);
    assert_eq!(response.items[2].decision.action, Action::Review);
    assert_eq!(response.score, 55);
}

#[test]
fn test_custom_catalogue_descriptions() {
    let catalogue = CfopCatalogue::parse("5102;Venda de mercadoria adquirida\n5101;Venda de producao\n");
    let engine = CoherenceEngine::local().with_catalogue(Arc::new(catalogue));
    let response = engine.evaluate_local(&request("SP", "SP", vec![item(1, "Venda de teclado", "5102", "")]));
    let verdict = &response.items[0];
    assert_eq!(verdict.cfop_description, "Venda de mercadoria adquirida");
    assert_eq!(verdict.decision.action, Action::Keep);
    assert_eq!(verdict.candidates, vec!["5102", "5101"]);
}

#[test]
fn test_wire_request() {
    let raw = r#"{
        "issuer_state": "SP",
        "recipient_state": "RJ",
        "issuer_regime": "1",
        "items": [
            {"number": 1, "description": "Serviço de manutenção", "cfop": "6102"}
        ]
    }"#;
    let req: CoherenceRequest = serde_json::from_str(raw).unwrap();
    let response = CoherenceEngine::local().evaluate_local(&req);
    let verdict = &response.items[0];
    assert_eq!(verdict.findings[0].rule, rules::SALE_LOOKS_SERVICE);
    assert_eq!(verdict.suggested_cfop.as_deref(), Some("6301"));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["items"][0]["decision"]["action"], "block");
    assert_eq!(json["items"][0]["badge"], "INCOHERENT");
}
