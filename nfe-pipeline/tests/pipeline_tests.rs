//! End-to-end runs over the sample authorized invoice

use cfop_engine::{Action, Badge, CoherenceEngine, OperationKind};
use nfe_pipeline::{Config, Error, Pipeline};
use tax_audit::{read_orders, AuditConfig, AuditEngine, RiskLevel};

const NFE_PROC: &[u8] = include_bytes!("../../nfe-extractor/tests/data/nfe_proc.xml");

fn local_pipeline() -> Pipeline {
    Pipeline::with_engines(AuditEngine::new(AuditConfig::default()), CoherenceEngine::local())
}

#[tokio::test]
async fn test_sample_invoice_is_clean() {
    let report = local_pipeline()
        .process("nfe_proc.xml", NFE_PROC, None)
        .await
        .unwrap();

    assert_eq!(report.label, "nfe_proc.xml");
    assert_eq!(report.summary.items, 2);
    assert_eq!(
        report.summary.issued_at.map(|t| t.to_rfc3339()).as_deref(),
        Some("2024-01-15T10:30:00-03:00")
    );
    assert_eq!(report.summary.failed_validations, 0);
    assert!(report.audit.is_clean());
    assert_eq!(report.audit.risk, RiskLevel::Low);
    assert_eq!(report.summary.blocked_items, 0);
    assert!(report
        .coherence
        .items
        .iter()
        .all(|verdict| verdict.badge == Badge::Coherent));
    assert!(!report.coherence.adjudicated);
    assert_eq!(report.coherence.score, 0);

    let classification = &report.coherence.classification;
    assert_eq!(report.summary.operation, OperationKind::Sale);
    assert_eq!(classification.dominant_ncm, "85285200");
    assert_eq!(classification.sector.as_deref(), Some("machinery_electronics"));
    assert_eq!(classification.cost_centers, vec!["Engineering", "IT"]);
    assert_eq!(report.summary.sector_findings, 0);
}

#[tokio::test]
async fn test_report_json_keeps_decimal_strings() {
    let report = local_pipeline()
        .process("nfe_proc.xml", NFE_PROC, None)
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["recomputation"]["gross_sum"], "1855.00");
    assert_eq!(json["document"]["totals"]["document"], "1850.00");
    assert_eq!(json["coherence"]["items"][0]["informed_cfop"], "5102");
    assert_eq!(json["summary"]["audit_risk"], "LOW");
    assert_eq!(json["summary"]["operation"], "sale");
}

#[tokio::test]
async fn test_tampered_invoice() {
    let xml = String::from_utf8(NFE_PROC.to_vec())
        .unwrap()
        .replace("<CFOP>5102</CFOP>", "<CFOP>6551</CFOP>")
        .replacen("<vICMS>288.00</vICMS>", "<vICMS>250.00</vICMS>", 1);

    let report = local_pipeline()
        .process("tampered.xml", xml.as_bytes(), None)
        .await
        .unwrap();

    assert_eq!(report.summary.audit_findings, 1);
    assert_eq!(report.summary.blocked_items, 2);
    let first = &report.coherence.items[0];
    assert_eq!(first.decision.action, Action::Block);
    assert_eq!(first.badge, Badge::Incoherent);
    assert_eq!(first.informed_cfop, "6551");
}

#[tokio::test]
async fn test_orders_are_reconciled() {
    let orders = read_orders("descricao;quantidade;vunit\nMonitor LED;2;800,00\nTeclado sem fio;1;120,00\n".as_bytes()).unwrap();
    let report = local_pipeline()
        .process("nfe_proc.xml", NFE_PROC, Some(&orders))
        .await
        .unwrap();
    assert_eq!(report.summary.audit_findings, 1);
    assert_eq!(report.audit.findings[0].code, "order_item_not_found");
}

#[tokio::test]
async fn test_failures_carry_the_document_label() {
    let pipeline = local_pipeline();

    let err = pipeline
        .process("broken.xml", b"<nfeProc><NFe>", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Extraction(_)));
    assert_eq!(err.document(), Some("broken.xml"));

    let err = pipeline
        .process("empty.xml", b"<nfeProc/>", None)
        .await
        .unwrap_err();
    assert_eq!(err.document(), Some("empty.xml"));
    assert!(err.to_string().contains("infNFe"));

    let err = pipeline
        .process_file("/nonexistent/nota.xml", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
    assert_eq!(err.document(), Some("/nonexistent/nota.xml"));
}

#[tokio::test]
async fn test_process_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nota.xml");
    std::fs::write(&path, NFE_PROC).unwrap();

    let report = local_pipeline().process_file(&path, None).await.unwrap();
    assert_eq!(report.label, path.display().to_string());
    assert!(report.audit.is_clean());
}

#[tokio::test]
async fn test_each_pipeline_keeps_its_own_catalogue() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    std::fs::write(&first, "5102;Revenda de mercadoria\n").unwrap();
    std::fs::write(&second, "5102;Venda de mercadoria adquirida\n").unwrap();

    let pipeline = |path: &std::path::Path| {
        Pipeline::new(&Config {
            cfop_catalogue_path: Some(path.to_path_buf()),
            ..Default::default()
        })
        .unwrap()
    };
    let resale = pipeline(first.as_path());
    let acquired = pipeline(second.as_path());

    let report = resale.process("nfe_proc.xml", NFE_PROC, None).await.unwrap();
    assert_eq!(report.coherence.items[0].cfop_description, "Revenda de mercadoria");
    let report = acquired.process("nfe_proc.xml", NFE_PROC, None).await.unwrap();
    assert_eq!(report.coherence.items[0].cfop_description, "Venda de mercadoria adquirida");

    let report = Pipeline::new(&Config::default())
        .unwrap()
        .process("nfe_proc.xml", NFE_PROC, None)
        .await
        .unwrap();
    assert_eq!(
        report.coherence.items[0].cfop_description,
        "Venda de mercadoria de terceiros (interna)"
    );
}
