//! Single-pass aggregation of audited claims into dashboard metrics.
//!
//! Everything is accumulated in locals owned by one call of
//! [`aggregate_claims`]; the function is pure over its input slice.

use serde::Serialize;
use std::collections::BTreeMap;

use shared::config::AggregationConfig;
use shared::models::date_utils::{month_key, month_label};
use shared::models::normalize::{normalize_key, resolve_text};
use shared::models::{ClaimRecord, ItemCategory};

use crate::accumulator::{AggregateBucket, Totals, percentage, ratio, round_to};
use crate::reasons::ReasonFilter;

pub const UNKNOWN_PROVIDER: &str = "Prestador não informado";
pub const UNKNOWN_AUDITOR: &str = "Auditor não informado";
pub const UNKNOWN_SPECIALTY: &str = "Especialidade não informada";

/// A named bucket in a ranking or breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub submitted: f64,
    pub denied: f64,
    pub approved: f64,
    pub count: u64,
    pub denied_count: u64,
    pub denial_rate: f64,
}

impl RankedEntry {
    fn from_totals(name: &str, totals: &Totals) -> Self {
        Self {
            name: name.to_string(),
            submitted: totals.submitted,
            denied: totals.denied,
            approved: totals.approved,
            count: totals.count,
            denied_count: totals.denied_count,
            denial_rate: totals.denial_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: ItemCategory,
    pub name: String,
    pub submitted: f64,
    pub denied: f64,
    pub approved: f64,
    pub items: u64,
    /// Share of the total denied amount falling in this category
    pub denied_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub period: String,
    pub label: String,
    pub submitted: f64,
    pub denied: f64,
    pub approved: f64,
    pub claims: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenialReasonEntry {
    pub reason: String,
    pub occurrences: u64,
    pub denied: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuantitySummary {
    pub requested: f64,
    pub authorized: f64,
    pub denied: f64,
    pub authorization_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClaimsSummary {
    pub total_submitted: f64,
    pub total_denied: f64,
    pub total_approved: f64,
    pub claim_count: u64,
    pub denied_claim_count: u64,
    pub denial_rate: f64,
    pub approval_rate: f64,
    pub denied_claim_share: f64,
    pub average_cost_per_claim: f64,
    pub average_denial_per_claim: f64,
    /// Days, one decimal
    pub average_length_of_stay: f64,
    /// Claims that entered the length-of-stay average
    pub length_of_stay_samples: u64,
    /// Stays above the configured limit (reported, still averaged)
    pub long_stay_flags: u64,
    pub top_providers: Vec<RankedEntry>,
    pub top_procedures: Vec<RankedEntry>,
    pub top_auditors: Vec<RankedEntry>,
    pub by_specialty: Vec<RankedEntry>,
    pub by_category: Vec<CategoryBreakdown>,
    pub monthly: Vec<MonthlyPoint>,
    pub denial_reasons: Vec<DenialReasonEntry>,
    pub quantities: QuantitySummary,
}

#[derive(Debug, Default)]
struct ReasonTally {
    occurrences: u64,
    denied: f64,
}

/// Aggregates a request's claims. Empty input yields zeros everywhere.
pub fn aggregate_claims(records: &[ClaimRecord], config: &AggregationConfig) -> ClaimsSummary {
    let reasons_filter = ReasonFilter::new(config.placeholder_reasons.as_slice());

    let mut overall = Totals::default();
    let mut providers: AggregateBucket<Totals> = AggregateBucket::new();
    let mut auditors: AggregateBucket<Totals> = AggregateBucket::new();
    let mut specialties: AggregateBucket<Totals> = AggregateBucket::new();
    let mut procedures: AggregateBucket<Totals> = AggregateBucket::new();
    let mut categories: BTreeMap<usize, (ItemCategory, Totals)> = BTreeMap::new();
    let mut months: BTreeMap<String, Totals> = BTreeMap::new();
    let mut reasons: AggregateBucket<ReasonTally> = AggregateBucket::new();
    let mut quantities = QuantitySummary::default();

    let mut stay_days_sum: i64 = 0;
    let mut stay_samples: u64 = 0;
    let mut long_stays: u64 = 0;

    for record in records {
        let items = record.effective_items();
        let (submitted, denied, approved) = items.iter().fold((0.0, 0.0, 0.0), |acc, item| {
            (
                acc.0 + item.submitted_amount,
                acc.1 + item.denied_amount,
                acc.2 + item.approved_amount,
            )
        });
        let has_denial = record.has_denial();

        overall.add(submitted, denied, approved, has_denial);

        let provider = resolve_text([Some(record.provider.as_str())], UNKNOWN_PROVIDER);
        providers
            .entry(&normalize_key(provider), provider)
            .add(submitted, denied, approved, has_denial);

        let auditor = resolve_text([Some(record.auditor.as_str())], UNKNOWN_AUDITOR);
        auditors
            .entry(&normalize_key(auditor), auditor)
            .add(submitted, denied, approved, has_denial);

        let specialty = resolve_text([Some(record.specialty.as_str())], UNKNOWN_SPECIALTY);
        specialties
            .entry(&normalize_key(specialty), specialty)
            .add(submitted, denied, approved, has_denial);

        if let Some(date) = record.period_date() {
            months
                .entry(month_key(date))
                .or_default()
                .add(submitted, denied, approved, has_denial);
        }

        match record.length_of_stay_days() {
            Some(days) => {
                stay_days_sum += days;
                stay_samples += 1;
                if days > config.long_stay_days {
                    long_stays += 1;
                }
            }
            None => {
                if record.admission_date.is_some() && record.discharge_date.is_some() {
                    log::debug!("Guia {} skipped from length of stay: discharge before admission", record.guide_number);
                }
            }
        }

        for item in items.iter() {
            let category = item.category();
            let position = ItemCategory::ALL.iter().position(|c| *c == category).unwrap_or(ItemCategory::ALL.len());
            categories
                .entry(position)
                .or_insert_with(|| (category, Totals::default()))
                .1
                .add(item.submitted_amount, item.denied_amount, item.approved_amount, item.is_denied());

            let procedure = item.procedure_label();
            procedures
                .entry(&normalize_key(procedure), procedure)
                .add(item.submitted_amount, item.denied_amount, item.approved_amount, item.is_denied());

            if item.is_denied() || item.quantity_denied > 0.0 {
                if let Some(reason) = reasons_filter.meaningful(item.denial_reason.as_deref()) {
                    let tally = reasons.entry(reason, reason);
                    tally.occurrences += 1;
                    tally.denied += item.denied_amount;
                }
            }

            quantities.requested += item.quantity_requested;
            quantities.authorized += item.quantity_authorized;
            quantities.denied += item.quantity_denied;
        }
    }

    quantities.authorization_rate = round_to(percentage(quantities.authorized, quantities.requested), 2);

    let claims = overall.count as f64;
    let top_n = config.top_n;

    let mut by_category: Vec<CategoryBreakdown> = categories
        .into_values()
        .map(|(category, totals)| CategoryBreakdown {
            category,
            name: category.display_name().to_string(),
            submitted: totals.submitted,
            denied: totals.denied,
            approved: totals.approved,
            items: totals.count,
            denied_share: round_to(percentage(totals.denied, overall.denied), 2),
        })
        .collect();
    by_category.sort_by(|a, b| b.denied.total_cmp(&a.denied));

    let skip = months.len().saturating_sub(config.months);
    let monthly = months
        .into_iter()
        .skip(skip)
        .map(|(period, totals)| MonthlyPoint {
            label: month_label(&period).unwrap_or_else(|| period.clone()),
            period,
            submitted: totals.submitted,
            denied: totals.denied,
            approved: totals.approved,
            claims: totals.count,
        })
        .collect();

    let denial_reasons = reasons
        .ranked_by(|tally| tally.occurrences as f64, top_n)
        .into_iter()
        .map(|entry| DenialReasonEntry {
            reason: entry.label.clone(),
            occurrences: entry.value.occurrences,
            denied: entry.value.denied,
        })
        .collect();

    let ranking = |bucket: &AggregateBucket<Totals>, limit: usize| -> Vec<RankedEntry> {
        bucket
            .ranked_by(|totals| totals.denied, limit)
            .into_iter()
            .map(|entry| RankedEntry::from_totals(&entry.label, &entry.value))
            .collect()
    };

    let summary = ClaimsSummary {
        total_submitted: overall.submitted,
        total_denied: overall.denied,
        total_approved: overall.approved,
        claim_count: overall.count,
        denied_claim_count: overall.denied_count,
        denial_rate: round_to(percentage(overall.denied, overall.submitted), 2),
        approval_rate: round_to(percentage(overall.approved, overall.submitted), 2),
        denied_claim_share: round_to(percentage(overall.denied_count as f64, claims), 2),
        average_cost_per_claim: round_to(ratio(overall.submitted, claims), 2),
        average_denial_per_claim: round_to(ratio(overall.denied, claims), 2),
        average_length_of_stay: round_to(ratio(stay_days_sum as f64, stay_samples as f64), 1),
        length_of_stay_samples: stay_samples,
        long_stay_flags: long_stays,
        top_providers: ranking(&providers, top_n),
        top_procedures: ranking(&procedures, top_n),
        top_auditors: ranking(&auditors, top_n),
        by_specialty: ranking(&specialties, specialties.len()),
        by_category,
        monthly,
        denial_reasons,
        quantities,
    };

    log::info!(
        "Aggregated {} claims: submitted {:.2}, denied {:.2} ({} denied claims)",
        summary.claim_count,
        summary.total_submitted,
        summary.total_denied,
        summary.denied_claim_count
    );

    summary
}
