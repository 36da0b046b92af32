//! Normalized document model
//!
//! Every decimal renders as a fixed-point string when serialized. Absent
//! leaves are `None` or empty strings and are dropped from the output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fully extracted invoice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// 44-digit access key, or empty
    pub access_key: String,
    /// `<ide>` block
    pub issue: IssueInfo,
    /// `<emit>` block
    pub issuer: Party,
    /// `<dest>` block
    pub recipient: Party,
    /// `<det>` entries in document order
    pub items: Vec<LineItem>,
    /// `<total><ICMSTot>`
    pub totals: Totals,
    /// `<protNFe><infProt>`, when the envelope carries it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// Identification block (`<ide>`)
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub numeric_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operation_nature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub series: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub number: String,
    /// `dhEmi`, or `dEmi` on older layouts
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issued_at: String,
    /// `tpNF`: 0 inbound, 1 outbound
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub direction: String,
    /// `idDest`: 1 internal, 2 interstate, 3 foreign
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub destination: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub municipality_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub emission_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub check_digit: String,
    /// `tpAmb`: 1 production, 2 homologation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub final_consumer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub presence: String,
}

/// National tax identifier of a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxId {
    /// Company number; 14 digits when well formed
    Cnpj(String),
    /// Individual number; 11 digits when well formed
    Cpf(String),
}

impl TaxId {
    /// Digits of the identifier
    pub fn digits(&self) -> &str {
        match self {
            TaxId::Cnpj(d) | TaxId::Cpf(d) => d,
        }
    }
}

/// Issuer or recipient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// CNPJ or CPF
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<TaxId>,
    /// Legal name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Trade name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trade_name: String,
    /// State registration (IE), possibly "ISENTO"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state_registration: String,
    /// State registration as tax substitute (IEST)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub substitute_registration: String,
    /// Municipal registration (IM)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub municipal_registration: String,
    /// Main economic activity (CNAE)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cnae: String,
    /// Fiscal regime code (CRT); issuer only
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub regime: String,
    /// Recipient IE indicator (indIEDest)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub registration_indicator: String,
    /// Contact e-mail
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Postal address
    pub address: Address,
}

impl Party {
    /// Two-letter state code from the address
    pub fn state(&self) -> &str {
        &self.address.state
    }
}

/// Postal address (`enderEmit` / `enderDest`)
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub complement: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub district: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub municipality_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub municipality: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
}

/// One `<det>` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// `nItem`, 1-based
    pub number: u32,
    /// `<prod>`
    pub product: Product,
    /// `<imposto>`
    pub taxes: ItemTaxes,
}

/// Product block (`<prod>`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Internal product code (cProd)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    /// Barcode (cEAN)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ean: String,
    /// Free-text description (xProd)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Tariff classification
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ncm: String,
    /// Tax substitution classification
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cest: String,
    /// Operation code
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cfop: String,
    /// Commercial unit
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    /// Commercial quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// Commercial unit price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    /// Gross amount (vProd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<Decimal>,
    /// Discount (vDesc)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    /// Freight (vFrete)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freight: Option<Decimal>,
    /// Insurance (vSeg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Decimal>,
    /// Other expenses (vOutro)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_expenses: Option<Decimal>,
    /// Taxable unit (uTrib)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tax_unit: String,
    /// Taxable quantity (qTrib)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_quantity: Option<Decimal>,
    /// Taxable unit price (vUnTrib)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_unit_price: Option<Decimal>,
    /// Whether vProd adds into the total (indTot)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub in_total: String,
    /// Purchase order number (xPed)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order_number: String,
    /// Purchase order line (nItemPed)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order_item: String,
}

/// Tax sub-records of an item; each one optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemTaxes {
    /// State VAT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icms: Option<Icms>,
    /// Excise tax
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipi: Option<Ipi>,
    /// Federal contribution PIS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pis: Option<Contribution>,
    /// Federal contribution COFINS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cofins: Option<Contribution>,
}

/// ICMS sub-record, from the first child of `<ICMS>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Icms {
    /// Child tag, e.g. `ICMS00` or `ICMSSN102`
    pub group: String,
    /// Goods origin
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,
    /// Situation code, normal regime
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cst: String,
    /// Situation code, simplified regime
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub csosn: String,
    /// Base determination mode
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_mode: String,
    /// Declared base (vBC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    /// Rate in percent (pICMS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    /// Declared amount (vICMS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Base reduction percent (pRedBC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_reduction: Option<Decimal>,
    /// ST base (vBCST)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub st_base: Option<Decimal>,
    /// ST rate (pICMSST)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub st_rate: Option<Decimal>,
    /// ST amount (vICMSST)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub st_amount: Option<Decimal>,
}

/// IPI sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ipi {
    /// Legal framing code (cEnq)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub framing_code: String,
    /// `IPITrib` was present (otherwise `IPINT`)
    pub taxed: bool,
    /// Situation code
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cst: String,
    /// Base (vBC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    /// Rate (pIPI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    /// Amount (vIPI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

/// Which child of `<PIS>` / `<COFINS>` carried the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionGroup {
    /// Ad valorem rate
    Aliq,
    /// Per-unit rate
    Qtde,
    /// Not taxed
    NT,
    /// Other situations
    Outr,
}

impl ContributionGroup {
    /// Every group, in lookup order
    pub const ALL: [ContributionGroup; 4] = [Self::Aliq, Self::Qtde, Self::NT, Self::Outr];

    /// Tag suffix after `PIS` / `COFINS`
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Aliq => "Aliq",
            Self::Qtde => "Qtde",
            Self::NT => "NT",
            Self::Outr => "Outr",
        }
    }
}

/// PIS or COFINS sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Source group
    pub group: ContributionGroup,
    /// Situation code
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cst: String,
    /// Base (vBC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    /// Rate in percent (pPIS / pCOFINS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    /// Amount (vPIS / vCOFINS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Quantity base for per-unit rates (qBCProd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_base: Option<Decimal>,
    /// Per-unit rate (vAliqProd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_rate: Option<Decimal>,
}

/// Declared totals (`<ICMSTot>`)
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icms_base: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icms: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icms_relief: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcp: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub st_base: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub st: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcp_st: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcp_st_withheld: Option<Decimal>,
    /// Gross merchandise total (vProd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freight: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_duty: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipi: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipi_returned: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pis: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cofins: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_expenses: Option<Decimal>,
    /// Document total (vNF)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_taxes: Option<Decimal>,
}

/// Acceptance metadata (`<infProt>`)
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub received_at: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub digest: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}
