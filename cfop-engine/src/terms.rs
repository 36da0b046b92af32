//! Description keyword families
//!
//! Matching is by substring over a lowercased, whitespace-collapsed
//! description, so stems like `serviç` catch every inflection.

/// Durable goods that belong in fixed assets
pub const ASSET: &[&str] = &[
    "máquina", "equip", "veículo", "imobiliz", "mobiliár", "servidor", "notebook", "desktop",
    "cadeira", "mesa", "impressora", "roteador", "switch", "rack", "no-break", "nobreak",
];

/// Consumption material
pub const CONSUMPTION: &[&str] = &[
    "descartável", "papel", "tinta", "cartucho", "caneta", "parafuso", "detergente", "limpeza",
    "copinho", "copo", "café", "pano", "sabonete",
];

/// Bonus or donation
pub const BONUS: &[&str] = &["bonific", "brinde", "doaç", "gratuito", "sem custo", "sem valor"];

/// Samples
pub const SAMPLE: &[&str] = &["amostra", "sample"];

/// Demonstration
pub const DEMONSTRATION: &[&str] = &["demonstra", "demo"];

/// Electric energy
pub const ENERGY: &[&str] = &["energia", "kwh", "energia elétrica", "tarifa"];

/// Fuel
pub const FUEL: &[&str] = &["diesel", "gasolina", "etanol", "gás veicular", "gnv", "combust"];

/// Services
pub const SERVICE: &[&str] = &[
    "serviç", "instala", "manuten", "assessoria", "consultoria", "licença", "suporte",
];

/// Finished goods
pub const FINISHED_GOOD: &[&str] = &[
    "fonte", "monitor", "teclado", "mouse", "gabinete", "ssd", "hd", "hdd", "placa de vídeo",
    "gpu", "placa-mãe", "motherboard", "memória", "ram", "switch", "roteador", "notebook",
    "desktop", "cpu", "processador", "cooler", "headset", "webcam",
];

/// Industrial inputs
pub const INDUSTRIAL_INPUT: &[&str] = &[
    "matéria-prima", "materia-prima", "mp", "insumo", "granulado", "resina", "bobina", "lingote",
    "barra bruta", "chapas", "lote químico", "composto químico", "produto intermediário",
    "pigmento", "aditivo", "pellet", "partida", "base química",
];

/// Lowercase and collapse runs of whitespace
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether a normalized description contains any of the terms
pub fn contains_any(normalized: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| normalized.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Notebook   Dell\tI7 "), "notebook dell i7");
        assert_eq!(normalize("MÁQUINA"), "máquina");
    }

    #[test]
    fn test_contains_any() {
        let text = normalize("Serviço de manutenção");
        assert!(contains_any(&text, SERVICE));
        assert!(!contains_any(&text, ASSET));
        assert!(contains_any(&normalize("Parafuso sextavado"), CONSUMPTION));
    }
}
