use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::category::ItemCategory;
use super::date_utils::length_of_stay_days;
use super::lenient;
use super::normalize::resolve_first;

/// Denied amounts at or below this value are rounding noise, not a denial.
pub const DENIAL_NOISE_THRESHOLD: f64 = 0.01;

/// One billed item inside a claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(alias = "tipo", alias = "categoria", alias = "tipo_despesa", deserialize_with = "lenient::text")]
    pub category_code: String,
    #[serde(alias = "codigo", alias = "codigo_procedimento", deserialize_with = "lenient::text")]
    pub procedure_code: String,
    #[serde(alias = "descricao", alias = "procedimento", deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(alias = "valor_apresentado", deserialize_with = "lenient::amount")]
    pub submitted_amount: f64,
    #[serde(alias = "valor_glosado", alias = "valor_glosa", deserialize_with = "lenient::amount")]
    pub denied_amount: f64,
    #[serde(alias = "valor_apurado", alias = "valor_liberado", deserialize_with = "lenient::amount")]
    pub approved_amount: f64,
    #[serde(alias = "motivo_glosa", alias = "justificativa", deserialize_with = "lenient::opt_text")]
    pub denial_reason: Option<String>,
    #[serde(alias = "quantidade_solicitada", alias = "qtd_solicitada", deserialize_with = "lenient::amount")]
    pub quantity_requested: f64,
    #[serde(alias = "quantidade_autorizada", alias = "qtd_autorizada", deserialize_with = "lenient::amount")]
    pub quantity_authorized: f64,
    #[serde(alias = "quantidade_negada", alias = "qtd_negada", deserialize_with = "lenient::amount")]
    pub quantity_denied: f64,
}

impl LineItem {
    pub fn category(&self) -> ItemCategory {
        ItemCategory::from_code(&self.category_code)
    }

    pub fn is_denied(&self) -> bool {
        self.denied_amount > DENIAL_NOISE_THRESHOLD
    }

    /// Ranking key for procedures: description, else code, else a named default.
    pub fn procedure_label(&self) -> &str {
        super::normalize::resolve_text(
            [Some(self.description.as_str()), Some(self.procedure_code.as_str())],
            "Procedimento não identificado",
        )
    }
}

/// One audited or regulated healthcare claim ("guia").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimRecord {
    #[serde(alias = "numero_guia", alias = "guia", deserialize_with = "lenient::text")]
    pub guide_number: String,
    #[serde(alias = "prestador", alias = "nome_prestador", deserialize_with = "lenient::text")]
    pub provider: String,
    #[serde(alias = "enfermeiro", alias = "nome_auditor", deserialize_with = "lenient::text")]
    pub auditor: String,
    #[serde(alias = "especialidade", deserialize_with = "lenient::text")]
    pub specialty: String,
    #[serde(alias = "valor_apresentado", deserialize_with = "lenient::amount")]
    pub submitted_amount: f64,
    #[serde(alias = "valor_glosado", alias = "valor_glosa", deserialize_with = "lenient::amount")]
    pub denied_amount: f64,
    #[serde(alias = "valor_apurado", alias = "valor_liberado", deserialize_with = "lenient::amount")]
    pub approved_amount: f64,
    #[serde(alias = "data_internacao", alias = "data_admissao", deserialize_with = "lenient::opt_timestamp")]
    pub admission_date: Option<DateTime<Utc>>,
    #[serde(alias = "data_alta", deserialize_with = "lenient::opt_timestamp")]
    pub discharge_date: Option<DateTime<Utc>>,
    #[serde(alias = "data_auditoria", deserialize_with = "lenient::opt_timestamp")]
    pub audit_date: Option<DateTime<Utc>>,
    #[serde(alias = "data_solicitacao", deserialize_with = "lenient::opt_timestamp")]
    pub request_date: Option<DateTime<Utc>>,
    #[serde(alias = "itens", alias = "line_items", deserialize_with = "lenient::skip_invalid")]
    pub items: Vec<LineItem>,
}

impl ClaimRecord {
    /// Line items that carry this claim's money.
    ///
    /// A claim without items is represented by one synthetic `Outros` item
    /// built from its claim-level amounts.
    pub fn effective_items(&self) -> Cow<'_, [LineItem]> {
        if !self.items.is_empty() {
            return Cow::Borrowed(&self.items);
        }
        Cow::Owned(vec![LineItem {
            submitted_amount: self.submitted_amount,
            denied_amount: self.denied_amount,
            approved_amount: self.approved_amount,
            ..LineItem::default()
        }])
    }

    pub fn submitted_total(&self) -> f64 {
        self.effective_items().iter().map(|item| item.submitted_amount).sum()
    }

    pub fn denied_total(&self) -> f64 {
        self.effective_items().iter().map(|item| item.denied_amount).sum()
    }

    pub fn approved_total(&self) -> f64 {
        self.effective_items().iter().map(|item| item.approved_amount).sum()
    }

    /// True iff at least one line item is denied above the noise threshold.
    pub fn has_denial(&self) -> bool {
        self.effective_items().iter().any(LineItem::is_denied)
    }

    /// Date used for period bucketing: audit, discharge, admission, then request date.
    pub fn period_date(&self) -> Option<DateTime<Utc>> {
        resolve_first([self.audit_date, self.discharge_date, self.admission_date, self.request_date])
    }

    /// Length of stay in whole days, `None` when dates are missing or inverted.
    pub fn length_of_stay_days(&self) -> Option<i64> {
        match (self.admission_date, self.discharge_date) {
            (Some(admission), Some(discharge)) => length_of_stay_days(admission, discharge),
            _ => None,
        }
    }

    /// Case/diacritic-insensitive match on guide number, provider and auditor.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = super::normalize::normalize_key(needle);
        if needle.is_empty() {
            return true;
        }
        [&self.guide_number, &self.provider, &self.auditor]
            .iter()
            .any(|field| super::normalize::normalize_key(field).contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_portuguese_export() {
        let claim: ClaimRecord = serde_json::from_value(json!({
            "numero_guia": 12345,
            "prestador": "Hospital Central",
            "enfermeiro": "Ana",
            "data_internacao": "01/02/2024",
            "data_alta": "2024-02-05T10:00:00",
            "itens": [
                {"tipo": "03", "valor_apresentado": "1.000,00", "valor_glosado": "100", "motivo_glosa": "Material não autorizado"},
                {"tipo": "05", "valor_apresentado": 500, "valor_glosado": null}
            ]
        }))
        .unwrap();

        assert_eq!(claim.guide_number, "12345");
        assert_eq!(claim.auditor, "Ana");
        assert_eq!(claim.items.len(), 2);
        assert_eq!(claim.submitted_total(), 1500.0);
        assert_eq!(claim.denied_total(), 100.0);
        assert!(claim.has_denial());
        assert_eq!(claim.items[0].category(), ItemCategory::Materiais);
        assert_eq!(claim.length_of_stay_days(), Some(5));
    }

    #[test]
    fn test_malformed_item_is_dropped_and_claim_kept() {
        let claim: ClaimRecord = serde_json::from_value(json!({
            "guia": "G-9",
            "itens": [
                {"tipo": 3, "valor_apresentado": 1000, "valor_glosa": 100},
                "lixo"
            ]
        }))
        .unwrap();

        assert_eq!(claim.items.len(), 1);
        assert_eq!(claim.submitted_total(), 1000.0);
        assert_eq!(claim.denied_total(), 100.0);
        assert_eq!(claim.items[0].category(), ItemCategory::Materiais);
    }

    #[test]
    fn test_null_items_and_missing_fields() {
        let claim: ClaimRecord = serde_json::from_value(json!({"itens": null, "valor_apresentado": "abc"})).unwrap();
        assert!(claim.items.is_empty());
        assert_eq!(claim.submitted_total(), 0.0);
        assert!(!claim.has_denial());
        assert!(claim.period_date().is_none());
    }

    #[test]
    fn test_itemless_claim_uses_claim_amounts() {
        let claim = ClaimRecord {
            submitted_amount: 1000.0,
            denied_amount: 100.0,
            ..ClaimRecord::default()
        };
        let items = claim.effective_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category(), ItemCategory::Outros);
        assert!(claim.has_denial());
    }

    #[test]
    fn test_noise_denial_is_not_a_denial() {
        let claim = ClaimRecord {
            items: vec![LineItem { submitted_amount: 10.0, denied_amount: 0.01, ..LineItem::default() }],
            ..ClaimRecord::default()
        };
        assert!(!claim.has_denial());
    }

    #[test]
    fn test_period_date_precedence() {
        let audit = crate::parse_timestamp("2024-03-01");
        let admission = crate::parse_timestamp("2024-01-01");
        let mut claim = ClaimRecord { admission_date: admission, ..ClaimRecord::default() };
        assert_eq!(claim.period_date(), admission);
        claim.audit_date = audit;
        assert_eq!(claim.period_date(), audit);
    }

    #[test]
    fn test_procedure_label_fallbacks() {
        let mut item = LineItem { procedure_code: "10101012".into(), ..LineItem::default() };
        assert_eq!(item.procedure_label(), "10101012");
        item.description = "Consulta".into();
        assert_eq!(item.procedure_label(), "Consulta");
        assert_eq!(LineItem::default().procedure_label(), "Procedimento não identificado");
    }

    #[test]
    fn test_matches_search() {
        let claim = ClaimRecord { provider: "Clínica São José".into(), guide_number: "G-77".into(), ..ClaimRecord::default() };
        assert!(claim.matches_search("sao jose"));
        assert!(claim.matches_search("g-77"));
        assert!(claim.matches_search(""));
        assert!(!claim.matches_search("hospital"));
    }
}
