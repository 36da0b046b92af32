//! Per-item tax recomputation
//!
//! The recomputer only derives bases, rates and amounts; deciding whether a
//! gap matters is left to [`crate::AuditEngine`].

use nfe_extractor::decimal::or_zero;
use nfe_extractor::{Contribution, Icms, LineItem, NormalizedDocument, Product};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{AuditConfig, RegimeSelector};

/// Issuer regime codes (CRT) of the simplified regime
const SIMPLIFIED_REGIMES: [&str; 2] = ["1", "2"];

/// ICMS situation codes with no tax due
const EXEMPT_CST: [&str; 3] = ["40", "41", "50"];

/// Simplified-regime situation codes with no ICMS due on the item
const EXEMPT_CSOSN: [&str; 4] = ["102", "103", "300", "400"];

/// Round to cents, half away from zero
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `vProd - vDesc + vFrete + vSeg + vOutro + vIPI`, clamped to zero
pub fn additive_base(product: &Product, ipi_amount: Decimal) -> Decimal {
    let base = or_zero(product.gross_amount) - or_zero(product.discount)
        + or_zero(product.freight)
        + or_zero(product.insurance)
        + or_zero(product.other_expenses)
        + ipi_amount;
    base.max(Decimal::ZERO)
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Tax being recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxKind {
    /// State VAT
    Icms,
    /// Federal contribution PIS
    Pis,
    /// Federal contribution COFINS
    Cofins,
}

impl fmt::Display for TaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaxKind::Icms => "ICMS",
            TaxKind::Pis => "PIS",
            TaxKind::Cofins => "COFINS",
        };
        write!(f, "{}", label)
    }
}

/// Where the base came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseSource {
    /// Positive `vBC` in the document
    Declared,
    /// Additive formula over the product amounts
    Derived,
    /// Taxed quantity (`qBCProd`) for per-unit rates
    Quantity,
}

/// Where the rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Positive percentage in the document
    Declared,
    /// Per-unit amount (`vAliqProd`)
    PerUnit,
    /// Configured regime default
    RegimeDefault,
    /// Nothing usable; treated as zero
    Missing,
}

/// Why a computation is not compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Exempt, non-taxed or suspended situation code
    Exempt,
    /// The document carries no amount to compare with
    NotDeclared,
}

/// One recomputed tax on one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxComputation {
    /// Tax recomputed
    pub kind: TaxKind,
    /// Base used
    pub base: Decimal,
    /// Origin of the base
    pub base_source: BaseSource,
    /// Percentage, or per-unit amount when `rate_source` is `PerUnit`
    pub rate: Decimal,
    /// Origin of the rate
    pub rate_source: RateSource,
    /// Recomputed amount, rounded to cents
    pub computed: Decimal,
    /// Amount declared in the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared: Option<Decimal>,
    /// Set when the computation must not be compared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl TaxComputation {
    /// Whether this computation takes part in reconciliation
    pub fn is_comparable(&self) -> bool {
        self.skipped.is_none() && self.declared.is_some()
    }

    /// Human-readable rate, e.g. `18.00%` or `0.8600/un`
    pub fn rate_label(&self) -> String {
        match self.rate_source {
            RateSource::PerUnit => format!("{}/un", self.rate),
            _ => format!("{}%", self.rate),
        }
    }
}

/// All recomputed taxes of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecomputation {
    /// Item number (`nItem`)
    pub item: u32,
    /// Product description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Gross amount (`vProd`)
    pub gross_amount: Decimal,
    /// ICMS, when the item carries an ICMS record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icms: Option<TaxComputation>,
    /// PIS, when the item carries a PIS record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pis: Option<TaxComputation>,
    /// COFINS, when the item carries a COFINS record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cofins: Option<TaxComputation>,
}

impl ItemRecomputation {
    /// Present computations in ICMS, PIS, COFINS order
    pub fn computations(&self) -> impl Iterator<Item = &TaxComputation> {
        [&self.icms, &self.pis, &self.cofins]
            .into_iter()
            .filter_map(|c| c.as_ref())
    }
}

/// Recomputation of a whole document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recomputation {
    /// One entry per line item, in document order
    pub items: Vec<ItemRecomputation>,
    /// Sum of item gross amounts
    pub gross_sum: Decimal,
}

/// Recomputes item taxes from document fields
#[derive(Debug, Clone, Default)]
pub struct Recomputer {
    regime: RegimeSelector,
}

impl Recomputer {
    /// Create a recomputer with the configured rate fallback
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            regime: config.regime,
        }
    }

    /// Recompute every item of a document
    pub fn recompute(&self, document: &NormalizedDocument) -> Recomputation {
        let issuer_regime = document.issuer.regime.as_str();
        let items: Vec<ItemRecomputation> = document
            .items
            .iter()
            .map(|item| self.recompute_item(item, issuer_regime))
            .collect();
        let gross_sum = items.iter().map(|i| i.gross_amount).sum();

        Recomputation { items, gross_sum }
    }

    /// Recompute one item; `issuer_regime` is the issuer's CRT
    pub fn recompute_item(&self, item: &LineItem, issuer_regime: &str) -> ItemRecomputation {
        let product = &item.product;
        let ipi_amount = item
            .taxes
            .ipi
            .as_ref()
            .and_then(|ipi| positive(ipi.amount))
            .unwrap_or(Decimal::ZERO);

        let fallback = self.fallback_rates(issuer_regime);

        let icms = item
            .taxes
            .icms
            .as_ref()
            .map(|icms| recompute_icms(icms, product, ipi_amount));
        let pis = item.taxes.pis.as_ref().map(|pis| {
            recompute_contribution(TaxKind::Pis, pis, product, ipi_amount, fallback.map(|r| r.0))
        });
        let cofins = item.taxes.cofins.as_ref().map(|cofins| {
            recompute_contribution(
                TaxKind::Cofins,
                cofins,
                product,
                ipi_amount,
                fallback.map(|r| r.1),
            )
        });

        debug!(
            "Recomputed item {}: icms={:?} pis={:?} cofins={:?}",
            item.number,
            icms.as_ref().map(|c| c.computed),
            pis.as_ref().map(|c| c.computed),
            cofins.as_ref().map(|c| c.computed)
        );

        ItemRecomputation {
            item: item.number,
            description: product.description.clone(),
            gross_amount: or_zero(product.gross_amount),
            icms,
            pis,
            cofins,
        }
    }

    /// Regime default rates, unless the issuer is in the simplified regime
    fn fallback_rates(&self, issuer_regime: &str) -> Option<(Decimal, Decimal)> {
        if SIMPLIFIED_REGIMES.contains(&issuer_regime.trim()) {
            return None;
        }
        self.regime.default_rates()
    }
}

fn recompute_icms(icms: &Icms, product: &Product, ipi_amount: Decimal) -> TaxComputation {
    let (base, base_source) = match positive(icms.base) {
        Some(declared) => (declared, BaseSource::Declared),
        None => {
            let mut base = additive_base(product, ipi_amount);
            if let Some(reduction) = positive(icms.base_reduction) {
                base *= Decimal::ONE - reduction / Decimal::ONE_HUNDRED;
            }
            (base.max(Decimal::ZERO), BaseSource::Derived)
        }
    };

    let (rate, rate_source) = match positive(icms.rate) {
        Some(rate) => (rate, RateSource::Declared),
        None => (Decimal::ZERO, RateSource::Missing),
    };

    let exempt = EXEMPT_CST.contains(&icms.cst.as_str()) || EXEMPT_CSOSN.contains(&icms.csosn.as_str());
    let skipped = if exempt {
        Some(SkipReason::Exempt)
    } else if icms.amount.is_none() {
        Some(SkipReason::NotDeclared)
    } else {
        None
    };

    TaxComputation {
        kind: TaxKind::Icms,
        base,
        base_source,
        rate,
        rate_source,
        computed: round_cents(base * rate / Decimal::ONE_HUNDRED),
        declared: icms.amount,
        skipped,
    }
}

fn recompute_contribution(
    kind: TaxKind,
    contribution: &Contribution,
    product: &Product,
    ipi_amount: Decimal,
    fallback_rate: Option<Decimal>,
) -> TaxComputation {
    let skipped = contribution.amount.is_none().then_some(SkipReason::NotDeclared);

    if let (Some(quantity), Some(unit_rate)) = (
        positive(contribution.quantity_base),
        positive(contribution.unit_rate),
    ) {
        return TaxComputation {
            kind,
            base: quantity,
            base_source: BaseSource::Quantity,
            rate: unit_rate,
            rate_source: RateSource::PerUnit,
            computed: round_cents(quantity * unit_rate),
            declared: contribution.amount,
            skipped,
        };
    }

    let (base, base_source) = match positive(contribution.base) {
        Some(declared) => (declared, BaseSource::Declared),
        None => (additive_base(product, ipi_amount), BaseSource::Derived),
    };

    let (rate, rate_source) = match (positive(contribution.rate), fallback_rate) {
        (Some(rate), _) => (rate, RateSource::Declared),
        (None, Some(rate)) => (rate, RateSource::RegimeDefault),
        (None, None) => (Decimal::ZERO, RateSource::Missing),
    };

    TaxComputation {
        kind,
        base,
        base_source,
        rate,
        rate_source,
        computed: round_cents(base * rate / Decimal::ONE_HUNDRED),
        declared: contribution.amount,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfe_extractor::{ContributionGroup, Ipi, ItemTaxes};
    use rust_decimal_macros::dec;

    fn product(gross: Decimal) -> Product {
        Product {
            description: "Item".to_string(),
            gross_amount: Some(gross),
            ..Default::default()
        }
    }

    fn contribution(base: Option<Decimal>, rate: Option<Decimal>, amount: Option<Decimal>) -> Contribution {
        Contribution {
            group: ContributionGroup::Aliq,
            cst: "01".to_string(),
            base,
            rate,
            amount,
            quantity_base: None,
            unit_rate: None,
        }
    }

    fn item(taxes: ItemTaxes, product: Product) -> LineItem {
        LineItem {
            number: 1,
            product,
            taxes,
        }
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(dec!(0.125)), dec!(0.13));
        assert_eq!(round_cents(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_cents(dec!(0.124)), dec!(0.12));
    }

    #[test]
    fn test_icms_declared_base() {
        let icms = Icms {
            cst: "00".to_string(),
            base: Some(dec!(1000.00)),
            rate: Some(dec!(18)),
            amount: Some(dec!(180.00)),
            ..Default::default()
        };
        let result = recompute_icms(&icms, &product(dec!(1000.00)), Decimal::ZERO);
        assert_eq!(result.computed, dec!(180.00));
        assert_eq!(result.base_source, BaseSource::Declared);
        assert!(result.is_comparable());
    }

    #[test]
    fn test_icms_derived_base_with_ipi_and_reduction() {
        let mut prod = product(dec!(1000.00));
        prod.discount = Some(dec!(100.00));
        prod.freight = Some(dec!(50.00));
        let icms = Icms {
            cst: "20".to_string(),
            rate: Some(dec!(12)),
            amount: Some(dec!(0)),
            base_reduction: Some(dec!(10)),
            ..Default::default()
        };
        // (1000 - 100 + 50 + 50) * 0.9 = 900
        let result = recompute_icms(&icms, &prod, dec!(50.00));
        assert_eq!(result.base, dec!(900));
        assert_eq!(result.base_source, BaseSource::Derived);
        assert_eq!(result.computed, dec!(108.00));
    }

    #[test]
    fn test_icms_exempt_and_undeclared_are_skipped() {
        let exempt = Icms {
            cst: "40".to_string(),
            amount: Some(dec!(0)),
            ..Default::default()
        };
        let result = recompute_icms(&exempt, &product(dec!(10)), Decimal::ZERO);
        assert_eq!(result.skipped, Some(SkipReason::Exempt));

        let simplified = Icms {
            csosn: "102".to_string(),
            ..Default::default()
        };
        let result = recompute_icms(&simplified, &product(dec!(10)), Decimal::ZERO);
        assert_eq!(result.skipped, Some(SkipReason::Exempt));

        let undeclared = Icms {
            cst: "00".to_string(),
            rate: Some(dec!(18)),
            ..Default::default()
        };
        let result = recompute_icms(&undeclared, &product(dec!(10)), Decimal::ZERO);
        assert_eq!(result.skipped, Some(SkipReason::NotDeclared));
        assert!(!result.is_comparable());
    }

    #[test]
    fn test_base_never_negative() {
        let mut prod = product(dec!(10.00));
        prod.discount = Some(dec!(25.00));
        assert_eq!(additive_base(&prod, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_contribution_per_unit() {
        let mut pis = contribution(None, None, Some(dec!(8.60)));
        pis.group = ContributionGroup::Qtde;
        pis.quantity_base = Some(dec!(10));
        pis.unit_rate = Some(dec!(0.86));

        let result = recompute_contribution(TaxKind::Pis, &pis, &product(dec!(500)), Decimal::ZERO, None);
        assert_eq!(result.base_source, BaseSource::Quantity);
        assert_eq!(result.rate_source, RateSource::PerUnit);
        assert_eq!(result.computed, dec!(8.60));
        assert_eq!(result.rate_label(), "0.86/un");
    }

    #[test]
    fn test_rate_fallback_applies_only_outside_simplified_regime() {
        let config = AuditConfig {
            regime: RegimeSelector::RealProfit,
            ..Default::default()
        };
        let recomputer = Recomputer::new(&config);
        let taxes = ItemTaxes {
            pis: Some(contribution(None, None, Some(dec!(16.50)))),
            cofins: Some(contribution(None, Some(dec!(0)), Some(dec!(76.00)))),
            ..Default::default()
        };
        let line = item(taxes, product(dec!(1000.00)));

        let normal = recomputer.recompute_item(&line, "3");
        let pis = normal.pis.as_ref().unwrap();
        assert_eq!(pis.rate_source, RateSource::RegimeDefault);
        assert_eq!(pis.computed, dec!(16.50));
        assert_eq!(normal.cofins.as_ref().unwrap().computed, dec!(76.00));

        let simplified = recomputer.recompute_item(&line, "1");
        let pis = simplified.pis.as_ref().unwrap();
        assert_eq!(pis.rate_source, RateSource::Missing);
        assert_eq!(pis.computed, dec!(0.00));
    }

    #[test]
    fn test_fallback_never_overrides_declared_rate() {
        let config = AuditConfig {
            regime: RegimeSelector::PresumedProfit,
            ..Default::default()
        };
        let recomputer = Recomputer::new(&config);
        let taxes = ItemTaxes {
            pis: Some(contribution(None, Some(dec!(1.65)), Some(dec!(16.50)))),
            ..Default::default()
        };
        let result = recomputer.recompute_item(&item(taxes, product(dec!(1000.00))), "3");
        let pis = result.pis.unwrap();
        assert_eq!(pis.rate, dec!(1.65));
        assert_eq!(pis.rate_source, RateSource::Declared);
    }

    #[test]
    fn test_contribution_base_includes_ipi() {
        let recomputer = Recomputer::default();
        let taxes = ItemTaxes {
            ipi: Some(Ipi {
                taxed: true,
                amount: Some(dec!(100.00)),
                ..Default::default()
            }),
            cofins: Some(contribution(None, Some(dec!(7.60)), Some(dec!(83.60)))),
            ..Default::default()
        };
        let result = recomputer.recompute_item(&item(taxes, product(dec!(1000.00))), "3");
        let cofins = result.cofins.unwrap();
        assert_eq!(cofins.base, dec!(1100.00));
        assert_eq!(cofins.computed, dec!(83.60));
    }

    #[test]
    fn test_document_gross_sum() {
        let mut document = NormalizedDocument::default();
        document.items.push(item(ItemTaxes::default(), product(dec!(100.00))));
        document.items.push(item(ItemTaxes::default(), product(dec!(250.50))));

        let recomputation = Recomputer::default().recompute(&document);
        assert_eq!(recomputation.gross_sum, dec!(350.50));
        assert_eq!(recomputation.items.len(), 2);
    }
}
