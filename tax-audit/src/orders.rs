//! Purchase-order sidecar
//!
//! Reads a CSV extract of a purchase order. The delimiter is `;` or `,`,
//! sniffed from the header line, and headers may use any of the aliases
//! below. Decimal cells accept a comma separator.

use nfe_extractor::decimal::parse_decimal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::recompute::round_cents;
use crate::{Error, Result};

const CODE_HEADERS: [&str; 3] = ["codigo", "cprod", "code"];
const DESCRIPTION_HEADERS: [&str; 2] = ["descricao", "description"];
const QUANTITY_HEADERS: [&str; 2] = ["quantidade", "quantity"];
const UNIT_PRICE_HEADERS: [&str; 3] = ["vunit", "valor", "unit_price"];

/// One purchase-order line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product code or barcode
    pub code: String,
    /// Description
    pub description: String,
    /// Ordered quantity
    pub quantity: Option<Decimal>,
    /// Agreed unit price
    pub unit_price: Option<Decimal>,
}

impl OrderLine {
    /// `unit_price * quantity` in cents, when both are positive
    pub fn expected_total(&self) -> Option<Decimal> {
        match (self.unit_price, self.quantity) {
            (Some(price), Some(qty)) if price > Decimal::ZERO && qty > Decimal::ZERO => {
                Some(round_cents(price * qty))
            }
            _ => None,
        }
    }

    /// Code if present, else description
    pub fn label(&self) -> &str {
        if self.code.is_empty() {
            &self.description
        } else {
            &self.code
        }
    }
}

struct Columns {
    code: Option<usize>,
    description: Option<usize>,
    quantity: Option<usize>,
    unit_price: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.contains(&h.trim().to_lowercase().as_str()))
        };
        let columns = Columns {
            code: find(&CODE_HEADERS),
            description: find(&DESCRIPTION_HEADERS),
            quantity: find(&QUANTITY_HEADERS),
            unit_price: find(&UNIT_PRICE_HEADERS),
        };
        if columns.code.is_none() && columns.description.is_none() {
            return Err(Error::OrderSheet(
                "Order sheet needs a code or description column".to_string(),
            ));
        }
        Ok(columns)
    }

    fn cell<'r>(record: &'r csv::StringRecord, index: Option<usize>) -> &'r str {
        index.and_then(|i| record.get(i)).map(str::trim).unwrap_or("")
    }
}

fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    if header.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Read order lines from any reader
pub fn read_orders(mut reader: impl Read) -> Result<Vec<OrderLine>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let content = content.trim_start_matches('\u{feff}');

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let columns = Columns::locate(csv_reader.headers()?)?;

    let mut lines = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = OrderLine {
            code: Columns::cell(&record, columns.code).to_string(),
            description: Columns::cell(&record, columns.description).to_string(),
            quantity: parse_decimal(Columns::cell(&record, columns.quantity)),
            unit_price: parse_decimal(Columns::cell(&record, columns.unit_price)),
        };
        if line.code.is_empty() && line.description.is_empty() {
            debug!("Skipping blank order row");
            continue;
        }
        lines.push(line);
    }

    info!("Loaded {} purchase-order lines", lines.len());
    Ok(lines)
}

/// Read order lines from a file
pub fn read_orders_file(path: impl AsRef<Path>) -> Result<Vec<OrderLine>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_orders(file)
}
