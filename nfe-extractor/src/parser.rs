//! NF-e XML extraction
//!
//! Parsing goes through roxmltree with its default options, which refuse
//! any document type declaration. That closes off external entities and
//! entity expansion before a single element is read.

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::*;
use crate::validation::{validate_document, ValidationMap};
use crate::xml::{child, children, decimal, find_first, first_element, only_digits, text, text_any};

const KEY_PREFIX: &str = "NFE";

/// Extracted document plus its identifier verdicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// The normalized model
    pub document: NormalizedDocument,
    /// Side-channel identifier checks
    pub validations: ValidationMap,
}

/// Extract a document and validate its identifiers
///
/// `label` names the document in errors and logs.
pub fn extract(label: &str, xml: &[u8]) -> Result<Extraction> {
    let document = extract_document(label, xml)?;
    let validations = validate_document(&document);
    Ok(Extraction {
        document,
        validations,
    })
}

/// Extract the normalized model only
pub fn extract_document(label: &str, xml: &[u8]) -> Result<NormalizedDocument> {
    let invalid = |reason: String| Error::InvalidDocument {
        document: label.to_string(),
        reason,
    };

    let content = std::str::from_utf8(xml).map_err(|e| invalid(format!("not UTF-8: {}", e)))?;
    let content = content.trim_start_matches('\u{feff}');

    let doc = Document::parse(content).map_err(|e| {
        warn!("Rejecting document {}: {}", label, e);
        invalid(e.to_string())
    })?;

    let root = doc.root_element();
    let inf = find_inf_nfe(root).ok_or_else(|| Error::StructureNotFound {
        document: label.to_string(),
        node: "infNFe".to_string(),
    })?;

    let protocol = parse_protocol(root);
    let access_key = access_key(inf, protocol.as_ref());
    if access_key.is_empty() {
        debug!("Document {} has no usable access key", label);
    }

    let document = NormalizedDocument {
        access_key,
        issue: child(inf, "ide").map(parse_ide).unwrap_or_default(),
        issuer: child(inf, "emit")
            .map(|n| parse_party(n, "enderEmit"))
            .unwrap_or_default(),
        recipient: child(inf, "dest")
            .map(|n| parse_party(n, "enderDest"))
            .unwrap_or_default(),
        items: parse_items(inf),
        totals: child(inf, "total")
            .and_then(|n| child(n, "ICMSTot"))
            .map(parse_totals)
            .unwrap_or_default(),
        protocol,
    };

    info!(
        "Extracted document {}: {} items, key {}",
        label,
        document.items.len(),
        if document.access_key.is_empty() { "-" } else { document.access_key.as_str() }
    );

    Ok(document)
}

/// `nfeProc/NFe/infNFe`, then `NFe/infNFe`, then any `infNFe`
fn find_inf_nfe<'a, 'i>(root: Node<'a, 'i>) -> Option<Node<'a, 'i>> {
    find_first(root, "nfeProc")
        .and_then(|proc| child(proc, "NFe"))
        .and_then(|nfe| child(nfe, "infNFe"))
        .or_else(|| find_first(root, "NFe").and_then(|nfe| child(nfe, "infNFe")))
        .or_else(|| find_first(root, "infNFe"))
}

/// Key from `@Id` ("NFe" + 44 digits); falls back to the protocol's `chNFe`
fn access_key(inf: Node, protocol: Option<&Protocol>) -> String {
    let id = inf.attribute("Id").unwrap_or_default().trim();
    if let Some(prefix) = id.get(..KEY_PREFIX.len()) {
        if prefix.eq_ignore_ascii_case(KEY_PREFIX) {
            let digits = only_digits(&id[KEY_PREFIX.len()..]);
            if digits.len() == 44 {
                return digits;
            }
        }
    }
    protocol
        .map(|p| only_digits(&p.access_key))
        .filter(|digits| digits.len() == 44)
        .unwrap_or_default()
}

fn parse_ide(ide: Node) -> IssueInfo {
    IssueInfo {
        unit_code: text(ide, "cUF"),
        numeric_code: text(ide, "cNF"),
        operation_nature: text(ide, "natOp"),
        model: text(ide, "mod"),
        series: text(ide, "serie"),
        number: text(ide, "nNF"),
        issued_at: text_any(ide, &["dhEmi", "dEmi"]),
        direction: text(ide, "tpNF"),
        destination: text(ide, "idDest"),
        municipality_code: text(ide, "cMunFG"),
        emission_type: text(ide, "tpEmis"),
        check_digit: text(ide, "cDV"),
        environment: text(ide, "tpAmb"),
        purpose: text(ide, "finNFe"),
        final_consumer: text(ide, "indFinal"),
        presence: text(ide, "indPres"),
    }
}

fn parse_address(node: Option<Node>) -> Address {
    let Some(n) = node else {
        return Address::default();
    };
    Address {
        street: text(n, "xLgr"),
        number: text(n, "nro"),
        complement: text(n, "xCpl"),
        district: text(n, "xBairro"),
        municipality_code: text(n, "cMun"),
        municipality: text(n, "xMun"),
        state: text(n, "UF").to_ascii_uppercase(),
        postal_code: text(n, "CEP"),
        country_code: text(n, "cPais"),
        country: text(n, "xPais"),
        phone: text(n, "fone"),
    }
}

/// CNPJ wins over CPF; digits are kept whatever their count so validation can flag them
fn parse_tax_id(node: Node) -> Option<TaxId> {
    let cnpj = text(node, "CNPJ");
    if !cnpj.is_empty() {
        return Some(TaxId::Cnpj(only_digits(&cnpj)));
    }
    let cpf = text(node, "CPF");
    (!cpf.is_empty()).then(|| TaxId::Cpf(only_digits(&cpf)))
}

fn parse_party(node: Node, address_tag: &str) -> Party {
    Party {
        tax_id: parse_tax_id(node),
        name: text(node, "xNome"),
        trade_name: text(node, "xFant"),
        state_registration: text(node, "IE"),
        substitute_registration: text(node, "IEST"),
        municipal_registration: text(node, "IM"),
        cnae: text(node, "CNAE"),
        regime: text(node, "CRT"),
        registration_indicator: text(node, "indIEDest"),
        email: text(node, "email"),
        address: parse_address(child(node, address_tag)),
    }
}

fn parse_items(inf: Node) -> Vec<LineItem> {
    children(inf, "det")
        .enumerate()
        .map(|(index, det)| {
            let number = det
                .attribute("nItem")
                .and_then(|n| n.trim().parse::<u32>().ok())
                .unwrap_or(index as u32 + 1);
            LineItem {
                number,
                product: child(det, "prod").map(parse_product).unwrap_or_default(),
                taxes: child(det, "imposto").map(parse_taxes).unwrap_or_default(),
            }
        })
        .collect()
}

fn parse_product(prod: Node) -> Product {
    Product {
        code: text(prod, "cProd"),
        ean: text(prod, "cEAN"),
        description: text(prod, "xProd"),
        ncm: text(prod, "NCM"),
        cest: text(prod, "CEST"),
        cfop: text(prod, "CFOP"),
        unit: text(prod, "uCom"),
        quantity: decimal(prod, "qCom"),
        unit_price: decimal(prod, "vUnCom"),
        gross_amount: decimal(prod, "vProd"),
        discount: decimal(prod, "vDesc"),
        freight: decimal(prod, "vFrete"),
        insurance: decimal(prod, "vSeg"),
        other_expenses: decimal(prod, "vOutro"),
        tax_unit: text(prod, "uTrib"),
        tax_quantity: decimal(prod, "qTrib"),
        tax_unit_price: decimal(prod, "vUnTrib"),
        in_total: text(prod, "indTot"),
        order_number: text(prod, "xPed"),
        order_item: text(prod, "nItemPed"),
    }
}

fn parse_taxes(imposto: Node) -> ItemTaxes {
    ItemTaxes {
        icms: child(imposto, "ICMS").and_then(parse_icms),
        ipi: child(imposto, "IPI").map(parse_ipi),
        pis: child(imposto, "PIS").and_then(|n| parse_contribution(n, "PIS")),
        cofins: child(imposto, "COFINS").and_then(|n| parse_contribution(n, "COFINS")),
    }
}

/// `<ICMS>` always wraps exactly one group (ICMS00, ICMS20, ICMSSN102...)
fn parse_icms(icms: Node) -> Option<Icms> {
    let group = first_element(icms)?;
    Some(Icms {
        group: group.tag_name().name().to_string(),
        origin: text(group, "orig"),
        cst: text(group, "CST"),
        csosn: text(group, "CSOSN"),
        base_mode: text(group, "modBC"),
        base: decimal(group, "vBC"),
        rate: decimal(group, "pICMS"),
        amount: decimal(group, "vICMS"),
        base_reduction: decimal(group, "pRedBC"),
        st_base: decimal(group, "vBCST"),
        st_rate: decimal(group, "pICMSST"),
        st_amount: decimal(group, "vICMSST"),
    })
}

fn parse_ipi(ipi: Node) -> Ipi {
    let framing_code = text(ipi, "cEnq");
    match child(ipi, "IPITrib") {
        Some(trib) => Ipi {
            framing_code,
            taxed: true,
            cst: text(trib, "CST"),
            base: decimal(trib, "vBC"),
            rate: decimal(trib, "pIPI"),
            amount: decimal(trib, "vIPI"),
        },
        None => Ipi {
            framing_code,
            taxed: false,
            cst: child(ipi, "IPINT").map(|n| text(n, "CST")).unwrap_or_default(),
            ..Default::default()
        },
    }
}

/// PIS and COFINS share a layout; `prefix` is the tax name
fn parse_contribution(node: Node, prefix: &str) -> Option<Contribution> {
    ContributionGroup::ALL.iter().find_map(|group| {
        let tag = format!("{}{}", prefix, group.suffix());
        child(node, &tag).map(|n| Contribution {
            group: *group,
            cst: text(n, "CST"),
            base: decimal(n, "vBC"),
            rate: decimal(n, &format!("p{}", prefix)),
            amount: decimal(n, &format!("v{}", prefix)),
            quantity_base: decimal(n, "qBCProd"),
            unit_rate: decimal(n, "vAliqProd"),
        })
    })
}

fn parse_totals(tot: Node) -> Totals {
    Totals {
        icms_base: decimal(tot, "vBC"),
        icms: decimal(tot, "vICMS"),
        icms_relief: decimal(tot, "vICMSDeson"),
        fcp: decimal(tot, "vFCP"),
        st_base: decimal(tot, "vBCST"),
        st: decimal(tot, "vST"),
        fcp_st: decimal(tot, "vFCPST"),
        fcp_st_withheld: decimal(tot, "vFCPSTRet"),
        products: decimal(tot, "vProd"),
        freight: decimal(tot, "vFrete"),
        insurance: decimal(tot, "vSeg"),
        discount: decimal(tot, "vDesc"),
        import_duty: decimal(tot, "vII"),
        ipi: decimal(tot, "vIPI"),
        ipi_returned: decimal(tot, "vIPIDevol"),
        pis: decimal(tot, "vPIS"),
        cofins: decimal(tot, "vCOFINS"),
        other_expenses: decimal(tot, "vOutro"),
        document: decimal(tot, "vNF"),
        approximate_taxes: decimal(tot, "vTotTrib"),
    }
}

fn parse_protocol(root: Node) -> Option<Protocol> {
    let inf = find_first(root, "protNFe").and_then(|p| child(p, "infProt"))?;
    Some(Protocol {
        environment: text(inf, "tpAmb"),
        app_version: text(inf, "verAplic"),
        access_key: text(inf, "chNFe"),
        received_at: text(inf, "dhRecbto"),
        number: text(inf, "nProt"),
        digest: text(inf, "digVal"),
        status: text(inf, "cStat"),
        reason: text(inf, "xMotivo"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MINIMAL: &str = r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe">
  <infNFe Id="NFe35240112345678000195550010000123451876543216" versao="4.00">
    <ide><cUF>35</cUF><nNF>12345</nNF></ide>
    <det nItem="1">
      <prod><cProd>A1</cProd><xProd>Parafuso</xProd><CFOP>5102</CFOP><vProd>10,50</vProd></prod>
      <imposto>
        <ICMS><ICMS00><orig>0</orig><CST>00</CST><vBC>10.50</vBC><pICMS>18</pICMS><vICMS>1.89</vICMS></ICMS00></ICMS>
        <PIS><PISNT><CST>07</CST></PISNT></PIS>
      </imposto>
    </det>
  </infNFe>
</NFe>"#;

    #[test]
    fn test_minimal_document() {
        let doc = extract_document("minimal", MINIMAL.as_bytes()).unwrap();
        assert_eq!(doc.access_key, "35240112345678000195550010000123451876543216");
        assert_eq!(doc.issue.number, "12345");
        assert_eq!(doc.items.len(), 1);
        let item = &doc.items[0];
        assert_eq!(item.product.gross_amount, Some(dec!(10.50)));
        let icms = item.taxes.icms.as_ref().unwrap();
        assert_eq!(icms.group, "ICMS00");
        assert_eq!(icms.amount, Some(dec!(1.89)));
        let pis = item.taxes.pis.as_ref().unwrap();
        assert_eq!(pis.group, ContributionGroup::NT);
        assert_eq!(pis.amount, None);
        assert!(item.taxes.cofins.is_none());
        assert!(doc.protocol.is_none());
    }

    #[test]
    fn test_malformed_id_gives_empty_key() {
        let xml = MINIMAL.replace("NFe3524", "XX3524");
        let doc = extract_document("bad-id", xml.as_bytes()).unwrap();
        assert_eq!(doc.access_key, "");
    }

    #[test]
    fn test_item_number_falls_back_to_position() {
        let xml = MINIMAL.replace(r#"<det nItem="1">"#, "<det>");
        let doc = extract_document("no-nitem", xml.as_bytes()).unwrap();
        assert_eq!(doc.items[0].number, 1);
    }

    #[test]
    fn test_invalid_xml() {
        let err = extract_document("broken.xml", b"<NFe><infNFe>").unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
        assert_eq!(err.document(), "broken.xml");
    }

    #[test]
    fn test_missing_inf_nfe() {
        let err = extract_document("empty.xml", b"<NFe><other/></NFe>").unwrap_err();
        assert_eq!(
            err,
            Error::StructureNotFound {
                document: "empty.xml".into(),
                node: "infNFe".into()
            }
        );
    }

    #[test]
    fn test_non_utf8_rejected() {
        let err = extract_document("latin1.xml", &[0x3c, 0xff, 0xfe, 0x3e]).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
    }
}
