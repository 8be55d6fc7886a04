use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::claim::{ClaimRecord, LineItem};
use super::lenient;
use super::normalize::{normalize_key, resolve_first};

/// Explicit SLA marking carried by a regulated guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaFlag {
    RegulatedLate,
    RegulatedOnTime,
    Unflagged,
}

/// Normalized status text to SLA flag.
pub const SLA_STATUS_TABLE: &[(&str, SlaFlag)] = &[
    ("regulada fora do prazo", SlaFlag::RegulatedLate),
    ("regulado fora do prazo", SlaFlag::RegulatedLate),
    ("fora do prazo", SlaFlag::RegulatedLate),
    ("fora do sla", SlaFlag::RegulatedLate),
    ("atrasada", SlaFlag::RegulatedLate),
    ("atrasado", SlaFlag::RegulatedLate),
    ("vencida", SlaFlag::RegulatedLate),
    ("late", SlaFlag::RegulatedLate),
    ("regulated late", SlaFlag::RegulatedLate),
    ("regulada no prazo", SlaFlag::RegulatedOnTime),
    ("regulado no prazo", SlaFlag::RegulatedOnTime),
    ("no prazo", SlaFlag::RegulatedOnTime),
    ("dentro do prazo", SlaFlag::RegulatedOnTime),
    ("dentro do sla", SlaFlag::RegulatedOnTime),
    ("on time", SlaFlag::RegulatedOnTime),
    ("regulated on time", SlaFlag::RegulatedOnTime),
];

impl SlaFlag {
    /// Unknown or empty status text is `Unflagged`.
    pub fn from_status(status: &str) -> Self {
        let key = normalize_key(status);
        SLA_STATUS_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, flag)| *flag)
            .unwrap_or(SlaFlag::Unflagged)
    }
}

/// A guide that went through regulation (authorization review).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulationRecord {
    #[serde(alias = "numero_guia", alias = "guia", deserialize_with = "lenient::text")]
    pub guide_number: String,
    #[serde(alias = "tipo_guia", deserialize_with = "lenient::text")]
    pub guide_type: String,
    #[serde(alias = "prestador", deserialize_with = "lenient::text")]
    pub provider: String,
    #[serde(alias = "data_solicitacao", deserialize_with = "lenient::opt_timestamp")]
    pub request_date: Option<DateTime<Utc>>,
    #[serde(alias = "data_regulacao", alias = "data_decisao", deserialize_with = "lenient::opt_timestamp")]
    pub regulation_date: Option<DateTime<Utc>>,
    #[serde(alias = "status_sla", alias = "sla", deserialize_with = "lenient::text")]
    pub sla_status: String,
    #[serde(alias = "regulacao_automatica", alias = "auto_regulada", deserialize_with = "lenient::flag")]
    pub auto_regulated: bool,
    #[serde(alias = "reguladores", alias = "regulador", deserialize_with = "lenient::name_list")]
    pub handlers: Vec<String>,
    #[serde(alias = "itens", deserialize_with = "lenient::skip_invalid")]
    pub items: Vec<LineItem>,
}

impl RegulationRecord {
    pub fn sla_flag(&self) -> SlaFlag {
        SlaFlag::from_status(&self.sla_status)
    }

    /// Date used for weekly bucketing: regulation date, then request date.
    pub fn timeline_date(&self) -> Option<DateTime<Utc>> {
        resolve_first([self.regulation_date, self.request_date])
    }

    /// Claim view of the guide so the financial aggregation can run over it.
    ///
    /// Claim-level amounts are summed from the items; the regulation date
    /// stands in for the audit date.
    pub fn to_claim(&self) -> ClaimRecord {
        ClaimRecord {
            guide_number: self.guide_number.clone(),
            provider: self.provider.clone(),
            submitted_amount: self.items.iter().map(|item| item.submitted_amount).sum(),
            denied_amount: self.items.iter().map(|item| item.denied_amount).sum(),
            approved_amount: self.items.iter().map(|item| item.approved_amount).sum(),
            audit_date: self.regulation_date,
            request_date: self.request_date,
            items: self.items.clone(),
            ..ClaimRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sla_flag_lookup() {
        assert_eq!(SlaFlag::from_status("Regulada fora do prazo"), SlaFlag::RegulatedLate);
        assert_eq!(SlaFlag::from_status("  REGULADA NO PRAZO "), SlaFlag::RegulatedOnTime);
        assert_eq!(SlaFlag::from_status("Dentro do Prazo"), SlaFlag::RegulatedOnTime);
        assert_eq!(SlaFlag::from_status(""), SlaFlag::Unflagged);
        assert_eq!(SlaFlag::from_status("pendente"), SlaFlag::Unflagged);
    }

    #[test]
    fn test_deserialize_regulation_record() {
        let record: RegulationRecord = serde_json::from_value(json!({
            "numero_guia": "G1",
            "tipo_guia": "Internação",
            "data_solicitacao": "2024-03-11T09:00:00Z",
            "status_sla": "Regulada no prazo",
            "regulacao_automatica": "N",
            "reguladores": ["Dra. Maria", {"nome": "Rui"}]
        }))
        .unwrap();

        assert_eq!(record.sla_flag(), SlaFlag::RegulatedOnTime);
        assert!(!record.auto_regulated);
        assert_eq!(record.handlers, vec!["Dra. Maria", "Rui"]);
        assert_eq!(record.timeline_date(), record.request_date);
    }

    #[test]
    fn test_to_claim_carries_items_and_dates() {
        let record: RegulationRecord = serde_json::from_value(json!({
            "guia": "G7",
            "prestador": "Hospital Sul",
            "data_regulacao": "2024-05-02",
            "itens": [
                {"tipo": "1", "valor_apresentado": "100,00", "valor_glosa": 20},
                {"tipo": "5", "valor_apresentado": 50, "valor_glosa": 0}
            ]
        }))
        .unwrap();

        let claim = record.to_claim();
        assert_eq!(claim.guide_number, "G7");
        assert_eq!(claim.provider, "Hospital Sul");
        assert_eq!(claim.items.len(), 2);
        assert_eq!(claim.submitted_total(), 150.0);
        assert_eq!(claim.denied_amount, 20.0);
        assert_eq!(claim.period_date(), record.regulation_date);
        assert_eq!(claim.items[1].category(), crate::models::ItemCategory::Diarias);
    }
}
