//! Payloads for the three dashboards, built from already-fetched records.

use serde::Serialize;

use shared::config::DashboardConfig;
use shared::models::{ClaimRecord, RegulationRecord};

use crate::aggregator::{CategoryBreakdown, ClaimsSummary, MonthlyPoint, RankedEntry, aggregate_claims};
use crate::sla::{SlaReport, evaluate_sla};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditDashboard {
    #[serde(flatten)]
    pub summary: ClaimsSummary,
}

/// Regulation SLA next to the money of regulated and audited guides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingDashboard {
    pub sla: SlaReport,
    pub regulated: ClaimsSummary,
    pub audited: ClaimsSummary,
}

/// Revenue-cycle view: what was billed, what was paid and where it was lost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaturamentoDashboard {
    pub billed: f64,
    pub received: f64,
    pub denied: f64,
    pub claims: u64,
    pub approval_rate: f64,
    pub denial_rate: f64,
    pub average_ticket: f64,
    pub monthly: Vec<MonthlyPoint>,
    pub by_category: Vec<CategoryBreakdown>,
    pub by_specialty: Vec<RankedEntry>,
    pub top_providers: Vec<RankedEntry>,
}

pub fn build_audit_dashboard(claims: &[ClaimRecord], config: &DashboardConfig) -> AuditDashboard {
    AuditDashboard {
        summary: aggregate_claims(claims, &config.aggregation),
    }
}

pub fn build_billing_dashboard(
    regulation: &[RegulationRecord],
    claims: &[ClaimRecord],
    config: &DashboardConfig,
) -> BillingDashboard {
    let regulated_claims: Vec<ClaimRecord> = regulation.iter().map(RegulationRecord::to_claim).collect();
    BillingDashboard {
        sla: evaluate_sla(regulation, &config.sla),
        regulated: aggregate_claims(&regulated_claims, &config.aggregation),
        audited: aggregate_claims(claims, &config.aggregation),
    }
}

pub fn build_faturamento_dashboard(claims: &[ClaimRecord], config: &DashboardConfig) -> FaturamentoDashboard {
    let summary = aggregate_claims(claims, &config.aggregation);
    FaturamentoDashboard {
        billed: summary.total_submitted,
        received: summary.total_approved,
        denied: summary.total_denied,
        claims: summary.claim_count,
        approval_rate: summary.approval_rate,
        denial_rate: summary.denial_rate,
        average_ticket: summary.average_cost_per_claim,
        monthly: summary.monthly,
        by_category: summary.by_category,
        by_specialty: summary.by_specialty,
        top_providers: summary.top_providers,
    }
}
