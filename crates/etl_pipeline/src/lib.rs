pub mod accumulator;
pub mod aggregator;
pub mod dashboards;
pub mod reasons;
pub mod sla;

pub use aggregator::{ClaimsSummary, aggregate_claims};
pub use dashboards::{
    AuditDashboard, BillingDashboard, FaturamentoDashboard, build_audit_dashboard, build_billing_dashboard,
    build_faturamento_dashboard,
};
pub use sla::{SlaReport, evaluate_sla};
