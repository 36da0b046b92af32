//! NCM chapters and the Harmonized System sections they belong to

use serde::Serialize;
use std::ops::RangeInclusive;

/// One section of the nomenclature
#[derive(Debug, Clone, Serialize)]
pub struct NcmSection {
    /// Roman numeral
    pub numeral: &'static str,
    /// First and last chapter
    pub chapters: RangeInclusive<u8>,
    /// Short sector label
    pub sector: &'static str,
}

const SECTIONS: &[NcmSection] = &[
    NcmSection { numeral: "I", chapters: 1..=5, sector: "Animais vivos e produtos do reino animal" },
    NcmSection { numeral: "II", chapters: 6..=14, sector: "Produtos do reino vegetal" },
    NcmSection { numeral: "III", chapters: 15..=15, sector: "Gorduras e óleos" },
    NcmSection { numeral: "IV", chapters: 16..=24, sector: "Indústrias alimentares, bebidas e tabaco" },
    NcmSection { numeral: "V", chapters: 25..=27, sector: "Produtos minerais e combustíveis" },
    NcmSection { numeral: "VI", chapters: 28..=38, sector: "Indústrias químicas" },
    NcmSection { numeral: "VII", chapters: 39..=40, sector: "Plástico e borracha" },
    NcmSection { numeral: "VIII", chapters: 41..=43, sector: "Peles, couros e artigos de viagem" },
    NcmSection { numeral: "IX", chapters: 44..=46, sector: "Madeira, cortiça e cestaria" },
    NcmSection { numeral: "X", chapters: 47..=49, sector: "Celulose, papel e gráficos" },
    NcmSection { numeral: "XI", chapters: 50..=63, sector: "Matérias têxteis e vestuário" },
    NcmSection { numeral: "XII", chapters: 64..=67, sector: "Calçados e chapéus" },
    NcmSection { numeral: "XIII", chapters: 68..=70, sector: "Pedra, cerâmica e vidro" },
    NcmSection { numeral: "XIV", chapters: 71..=71, sector: "Pérolas, pedras e metais preciosos" },
    NcmSection { numeral: "XV", chapters: 72..=83, sector: "Metais comuns e suas obras" },
    NcmSection { numeral: "XVI", chapters: 84..=85, sector: "Máquinas, aparelhos e material elétrico" },
    NcmSection { numeral: "XVII", chapters: 86..=89, sector: "Material de transporte" },
    NcmSection { numeral: "XVIII", chapters: 90..=92, sector: "Instrumentos de precisão, médicos e musicais" },
    NcmSection { numeral: "XIX", chapters: 93..=93, sector: "Armas e munições" },
    NcmSection { numeral: "XX", chapters: 94..=96, sector: "Mercadorias diversas" },
    NcmSection { numeral: "XXI", chapters: 97..=97, sector: "Objetos de arte e antiguidades" },
];

/// Chapter (1..=97) from the leading two digits of an NCM code
pub fn chapter(ncm: &str) -> Option<u8> {
    let digits: String = ncm.chars().filter(|c| c.is_ascii_digit()).take(2).collect();
    if digits.len() < 2 {
        return None;
    }
    digits.parse::<u8>().ok().filter(|c| (1..=97).contains(c))
}

/// Section containing `chapter`
pub fn sector_for_chapter(chapter: u8) -> Option<&'static NcmSection> {
    SECTIONS.iter().find(|s| s.chapters.contains(&chapter))
}

/// Display label such as `Cap. 84 (Seção XVI: Máquinas, ...)`
pub fn chapter_label(chapter: u8) -> String {
    match sector_for_chapter(chapter) {
        Some(section) => format!("Cap. {:02} (Seção {}: {})", chapter, section.numeral, section.sector),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter() {
        assert_eq!(chapter("84713012"), Some(84));
        assert_eq!(chapter("0101.21.00"), Some(1));
        assert_eq!(chapter("9"), None);
        assert_eq!(chapter("00"), None);
        assert_eq!(chapter("98000000"), None);
    }

    #[test]
    fn test_sections_cover_all_chapters() {
        for c in 1..=97u8 {
            assert!(sector_for_chapter(c).is_some(), "chapter {c}");
        }
        assert!(sector_for_chapter(0).is_none());
        assert!(sector_for_chapter(98).is_none());
    }

    #[test]
    fn test_label() {
        assert_eq!(
            chapter_label(85),
            "Cap. 85 (Seção XVI: Máquinas, aparelhos e material elétrico)"
        );
        assert_eq!(chapter_label(99), "");
    }
}
