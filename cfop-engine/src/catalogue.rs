//! CFOP description catalogue
//!
//! Read-only once built. The built-in table is shared by every engine that
//! is not given its own; a `code;description` text file can replace it, `#`
//! starts a comment line and the separator may be `;`, `,` or a tab.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Error, Result};

static SHARED_BUILTIN: Lazy<Arc<CfopCatalogue>> = Lazy::new(|| Arc::new(CfopCatalogue::builtin()));

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;,\t]\s*").expect("valid separator regex"));

const BUILTIN: [(&str, &str); 28] = [
    ("5101", "Venda de produção do estabelecimento (interna)"),
    ("5102", "Venda de mercadoria de terceiros (interna)"),
    ("6101", "Venda de produção do estabelecimento (interestadual)"),
    ("6102", "Venda de mercadoria de terceiros (interestadual)"),
    ("5301", "Prestação de serviço de comunicação (interna)"),
    ("6301", "Prestação de serviço de comunicação (interestadual)"),
    ("5551", "Venda de bem do ativo imobilizado (interna)"),
    ("6551", "Venda de bem do ativo imobilizado (interestadual)"),
    ("5556", "Venda de material de uso e consumo (interna)"),
    ("6556", "Venda de material de uso e consumo (interestadual)"),
    ("2910", "Remessa em bonificação/doação"),
    ("5910", "Remessa em bonificação/doação (interna)"),
    ("6910", "Remessa em bonificação/doação (interestadual)"),
    ("2911", "Remessa de amostra"),
    ("5911", "Remessa de amostra (interna)"),
    ("6911", "Remessa de amostra (interestadual)"),
    ("2912", "Remessa para demonstração"),
    ("5912", "Remessa para demonstração (interna)"),
    ("6912", "Remessa para demonstração (interestadual)"),
    ("5251", "Fornecimento de energia elétrica (interna)"),
    ("2651", "Venda de combustível ou lubrificante (dentro do Estado)"),
    ("3651", "Venda de combustível ou lubrificante (fora do Estado)"),
    ("1501", "Entrada de insumo destinado à industrialização"),
    ("2501", "Entrada de insumo (interestadual) destinado à industrialização"),
    ("5501", "Remessa para industrialização (interna)"),
    ("6501", "Remessa para industrialização (interestadual)"),
    ("7101", "Venda para o exterior"),
    ("7501", "Exportação direta"),
];

/// Code to description table, ordered by code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfopCatalogue {
    entries: BTreeMap<String, String>,
}

impl CfopCatalogue {
    /// The built-in fallback table
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(code, desc)| (code.to_string(), desc.to_string()))
                .collect(),
        }
    }

    /// Parse catalogue text; lines that are not `dddd<sep>description` are skipped
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = SEPARATOR.splitn(line, 2);
            let (Some(code), Some(description)) = (parts.next(), parts.next()) else {
                continue;
            };
            let code = code.trim();
            if code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit()) {
                entries.insert(code.to_string(), description.trim().to_string());
            }
        }
        Self { entries }
    }

    /// Load a catalogue file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let catalogue = Self::parse(&text);
        if catalogue.is_empty() {
            return Err(Error::Catalogue(format!(
                "No CFOP entries in {}",
                path.display()
            )));
        }
        info!("Loaded {} CFOP entries from {}", catalogue.len(), path.display());
        Ok(catalogue)
    }

    /// Load a file, falling back to the built-in table on any failure
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                warn!("Using built-in CFOP catalogue: {}", e);
                Self::builtin()
            }),
            None => Self::builtin(),
        }
    }

    /// Description of a code, or empty
    pub fn description(&self, code: &str) -> &str {
        self.entries.get(code).map(String::as_str).unwrap_or("")
    }

    /// Whether the code is listed
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Codes in ascending order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The built-in table, built once and shared
pub fn shared_builtin() -> Arc<CfopCatalogue> {
    SHARED_BUILTIN.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin() {
        let catalogue = CfopCatalogue::builtin();
        assert_eq!(catalogue.len(), 28);
        assert_eq!(
            catalogue.description("5551"),
            "Venda de bem do ativo imobilizado (interna)"
        );
        assert_eq!(catalogue.description("9999"), "");
        assert_eq!(catalogue.codes().next(), Some("1501"));
    }

    #[test]
    fn test_parse_separators_and_comments() {
        let text = "# header\n5101; Venda de produção\n5102,Venda de terceiros\n6101\tVenda interestadual\n\nabc;ignored\n51;short\n";
        let catalogue = CfopCatalogue::parse(text);
        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.description("5101"), "Venda de produção");
        assert_eq!(catalogue.description("6101"), "Venda interestadual");
    }

    #[test]
    fn test_description_keeps_later_separators() {
        let catalogue = CfopCatalogue::parse("5949; Outra saída; não especificada");
        assert_eq!(catalogue.description("5949"), "Outra saída; não especificada");
    }

    #[test]
    fn test_load_and_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "5405;Venda com ST").unwrap();
        let loaded = CfopCatalogue::load(file.path()).unwrap();
        assert!(loaded.contains("5405"));

        let missing = CfopCatalogue::load_or_builtin(Some(Path::new("/nonexistent/cfop.txt")));
        assert_eq!(missing, CfopCatalogue::builtin());
    }

    #[test]
    fn test_shared_builtin_is_one_table() {
        assert!(shared_builtin().contains("5102"));
        assert!(Arc::ptr_eq(&shared_builtin(), &shared_builtin()));
    }
}
