use serde::{Deserialize, Serialize};

use super::normalize::normalize_key;

/// Expense category of a billed line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    GasesMedicinais,
    Medicamentos,
    Materiais,
    Diarias,
    TaxasAlugueis,
    Opme,
    Honorarios,
    Exames,
    Pacotes,
    Outros,
}

/// Normalized category code (TISS expense codes and usual abbreviations) to category.
pub const CATEGORY_CODES: &[(&str, ItemCategory)] = &[
    ("01", ItemCategory::GasesMedicinais),
    ("gas", ItemCategory::GasesMedicinais),
    ("gases", ItemCategory::GasesMedicinais),
    ("02", ItemCategory::Medicamentos),
    ("med", ItemCategory::Medicamentos),
    ("medicamento", ItemCategory::Medicamentos),
    ("medicamentos", ItemCategory::Medicamentos),
    ("03", ItemCategory::Materiais),
    ("mat", ItemCategory::Materiais),
    ("material", ItemCategory::Materiais),
    ("materiais", ItemCategory::Materiais),
    ("05", ItemCategory::Diarias),
    ("dia", ItemCategory::Diarias),
    ("diaria", ItemCategory::Diarias),
    ("diarias", ItemCategory::Diarias),
    ("07", ItemCategory::TaxasAlugueis),
    ("tax", ItemCategory::TaxasAlugueis),
    ("taxa", ItemCategory::TaxasAlugueis),
    ("taxas", ItemCategory::TaxasAlugueis),
    ("08", ItemCategory::Opme),
    ("opme", ItemCategory::Opme),
    ("hm", ItemCategory::Honorarios),
    ("honorario", ItemCategory::Honorarios),
    ("honorarios", ItemCategory::Honorarios),
    ("sadt", ItemCategory::Exames),
    ("exa", ItemCategory::Exames),
    ("exame", ItemCategory::Exames),
    ("exames", ItemCategory::Exames),
    ("pct", ItemCategory::Pacotes),
    ("pacote", ItemCategory::Pacotes),
    ("pacotes", ItemCategory::Pacotes),
];

impl ItemCategory {
    pub const ALL: [ItemCategory; 10] = [
        ItemCategory::GasesMedicinais,
        ItemCategory::Medicamentos,
        ItemCategory::Materiais,
        ItemCategory::Diarias,
        ItemCategory::TaxasAlugueis,
        ItemCategory::Opme,
        ItemCategory::Honorarios,
        ItemCategory::Exames,
        ItemCategory::Pacotes,
        ItemCategory::Outros,
    ];

    /// Looks the code up in [`CATEGORY_CODES`]; unknown or empty codes are `Outros`.
    ///
    /// Numeric codes are zero-padded to two digits, so `3` and `"03"` agree.
    pub fn from_code(code: &str) -> Self {
        let mut key = normalize_key(code);
        if !key.is_empty() && key.len() < 2 && key.chars().all(|c| c.is_ascii_digit()) {
            key = format!("{:0>2}", key);
        }
        CATEGORY_CODES
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, category)| *category)
            .unwrap_or(ItemCategory::Outros)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ItemCategory::GasesMedicinais => "Gases Medicinais",
            ItemCategory::Medicamentos => "Medicamentos",
            ItemCategory::Materiais => "Materiais",
            ItemCategory::Diarias => "Diárias",
            ItemCategory::TaxasAlugueis => "Taxas e Aluguéis",
            ItemCategory::Opme => "OPME",
            ItemCategory::Honorarios => "Honorários",
            ItemCategory::Exames => "Exames (SADT)",
            ItemCategory::Pacotes => "Pacotes",
            ItemCategory::Outros => "Outros",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_table() {
        assert_eq!(ItemCategory::from_code("03"), ItemCategory::Materiais);
        assert_eq!(ItemCategory::from_code(" MAT "), ItemCategory::Materiais);
        assert_eq!(ItemCategory::from_code("Diária"), ItemCategory::Diarias);
        assert_eq!(ItemCategory::from_code("OPME"), ItemCategory::Opme);
    }

    #[test]
    fn test_codes_without_leading_zero() {
        assert_eq!(ItemCategory::from_code("3"), ItemCategory::Materiais);
        assert_eq!(ItemCategory::from_code("1"), ItemCategory::GasesMedicinais);
        assert_eq!(ItemCategory::from_code(" 5 "), ItemCategory::Diarias);
        assert_eq!(ItemCategory::from_code("9"), ItemCategory::Outros);

        let item: crate::models::LineItem = serde_json::from_value(serde_json::json!({"tipo": 3})).unwrap();
        assert_eq!(item.category(), ItemCategory::Materiais);
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(ItemCategory::from_code(""), ItemCategory::Outros);
        assert_eq!(ItemCategory::from_code("99"), ItemCategory::Outros);
        assert_eq!(ItemCategory::from_code("materiais especiais"), ItemCategory::Outros);
    }

    #[test]
    fn test_codes_are_normalized_and_unique() {
        for (code, _) in CATEGORY_CODES {
            assert_eq!(normalize_key(code), *code);
            assert_eq!(CATEGORY_CODES.iter().filter(|(c, _)| c == code).count(), 1, "duplicate {}", code);
        }
    }

    #[test]
    fn test_display_names_distinct() {
        let mut names: Vec<_> = ItemCategory::ALL.iter().map(|c| c.display_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ItemCategory::ALL.len());
    }
}
