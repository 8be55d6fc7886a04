//! SLA compliance of regulated guides and automated-vs-human handling share.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use shared::config::SlaConfig;
use shared::models::date_utils::week_key;
use shared::models::normalize::{clean_display_name, handler_key, normalize_key, resolve_text};
use shared::models::{RegulationRecord, SlaFlag};

use crate::accumulator::{AggregateBucket, percentage, round_to};

pub const UNKNOWN_GUIDE_TYPE: &str = "Tipo não informado";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaOutcome {
    Compliant,
    NonCompliant,
}

/// Which rule decided the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaBasis {
    ExplicitLate,
    ExplicitOnTime,
    AutoRegulated,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlaClassification {
    pub outcome: SlaOutcome,
    pub basis: SlaBasis,
}

/// First matching rule wins: explicit late, explicit on time, auto-regulated,
/// then the configured default.
pub fn classify(record: &RegulationRecord, config: &SlaConfig) -> SlaClassification {
    let (outcome, basis) = match record.sla_flag() {
        SlaFlag::RegulatedLate => (SlaOutcome::NonCompliant, SlaBasis::ExplicitLate),
        SlaFlag::RegulatedOnTime => (SlaOutcome::Compliant, SlaBasis::ExplicitOnTime),
        SlaFlag::Unflagged if record.auto_regulated => (SlaOutcome::Compliant, SlaBasis::AutoRegulated),
        SlaFlag::Unflagged => {
            let outcome = if config.default_compliant {
                SlaOutcome::Compliant
            } else {
                SlaOutcome::NonCompliant
            };
            (outcome, SlaBasis::Default)
        }
    };
    SlaClassification { outcome, basis }
}

/// Who a record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Automated decision engine (no human handler, auto-regulated)
    Ai,
    /// Robotic human account
    Robot,
    Human { key: String, display: String },
    /// Neither handlers nor automation
    Other,
}

impl Handler {
    pub fn is_automated(&self) -> bool {
        matches!(self, Handler::Ai | Handler::Robot)
    }
}

/// Resolves handler names against the robotic-account aliases.
#[derive(Debug, Clone)]
pub struct HandlerResolver {
    robotic_keys: HashSet<String>,
}

impl HandlerResolver {
    pub fn new(config: &SlaConfig) -> Self {
        Self {
            robotic_keys: config.robotic_aliases.iter().map(|alias| handler_key(alias)).collect(),
        }
    }

    /// Zero or more attributions; a record with several handlers counts once per handler.
    pub fn attribute(&self, record: &RegulationRecord) -> Vec<Handler> {
        let humans: Vec<Handler> = record
            .handlers
            .iter()
            .filter_map(|name| {
                let key = handler_key(name);
                if key.is_empty() {
                    return None;
                }
                if self.robotic_keys.contains(&key) {
                    return Some(Handler::Robot);
                }
                Some(Handler::Human {
                    key,
                    display: clean_display_name(name),
                })
            })
            .collect();

        if !humans.is_empty() {
            humans
        } else if record.auto_regulated {
            vec![Handler::Ai]
        } else {
            vec![Handler::Other]
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceTally {
    pub total: u64,
    pub compliant: u64,
    pub non_compliant: u64,
    pub compliance_rate: f64,
}

impl ComplianceTally {
    fn record(&mut self, outcome: SlaOutcome) {
        self.total += 1;
        match outcome {
            SlaOutcome::Compliant => self.compliant += 1,
            SlaOutcome::NonCompliant => self.non_compliant += 1,
        }
        self.compliance_rate = round_to(percentage(self.compliant as f64, self.total as f64), 2);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRow {
    pub name: String,
    #[serde(flatten)]
    pub tally: ComplianceTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyCompliance {
    /// Sunday starting the week, `YYYY-MM-DD`
    pub week: String,
    #[serde(flatten)]
    pub tally: ComplianceTally,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutomationCounts {
    pub ai: u64,
    pub robot: u64,
    pub others: u64,
}

impl AutomationCounts {
    fn add(&mut self, handler: &Handler) {
        match handler {
            Handler::Ai => self.ai += 1,
            Handler::Robot => self.robot += 1,
            Handler::Human { .. } | Handler::Other => self.others += 1,
        }
    }

    fn total(&self) -> u64 {
        self.ai + self.robot + self.others
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationWeek {
    pub week: String,
    #[serde(flatten)]
    pub counts: AutomationCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutomationShare {
    #[serde(flatten)]
    pub counts: AutomationCounts,
    pub ai_share: f64,
    pub robot_share: f64,
    pub others_share: f64,
}

/// How many outcomes each rule produced; `defaulted` exposes the ambiguous default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasisCounts {
    pub explicit_late: u64,
    pub explicit_on_time: u64,
    pub auto_regulated: u64,
    pub defaulted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlaReport {
    pub overall: ComplianceTally,
    pub basis: BasisCounts,
    pub by_guide_type: Vec<ComplianceRow>,
    pub by_handler: Vec<ComplianceRow>,
    pub weekly_trend: Vec<WeeklyCompliance>,
    pub automation_timeline: Vec<AutomationWeek>,
    pub automation_share: AutomationShare,
    /// Records without any usable date (kept in totals, absent from weekly views)
    pub undated_records: u64,
}

pub fn evaluate_sla(records: &[RegulationRecord], config: &SlaConfig) -> SlaReport {
    let resolver = HandlerResolver::new(config);

    let mut overall = ComplianceTally::default();
    let mut basis = BasisCounts::default();
    let mut guide_types: AggregateBucket<ComplianceTally> = AggregateBucket::new();
    let mut handlers: AggregateBucket<ComplianceTally> = AggregateBucket::new();
    let mut weekly: BTreeMap<String, ComplianceTally> = BTreeMap::new();
    let mut timeline: BTreeMap<String, AutomationCounts> = BTreeMap::new();
    let mut share = AutomationCounts::default();
    let mut undated: u64 = 0;

    for record in records {
        let classification = classify(record, config);
        let outcome = classification.outcome;

        overall.record(outcome);
        match classification.basis {
            SlaBasis::ExplicitLate => basis.explicit_late += 1,
            SlaBasis::ExplicitOnTime => basis.explicit_on_time += 1,
            SlaBasis::AutoRegulated => basis.auto_regulated += 1,
            SlaBasis::Default => basis.defaulted += 1,
        }

        let guide_type = resolve_text([Some(record.guide_type.as_str())], UNKNOWN_GUIDE_TYPE);
        guide_types
            .entry(&normalize_key(guide_type), guide_type)
            .record(outcome);

        let week = record.timeline_date().map(week_key);
        if week.is_none() {
            undated += 1;
        }
        if let Some(week) = &week {
            weekly.entry(week.clone()).or_default().record(outcome);
        }

        for handler in resolver.attribute(record) {
            let (key, display) = match &handler {
                Handler::Ai => ("__ai__", config.ai_identity.as_str()),
                Handler::Robot => ("__robot__", config.robot_identity.as_str()),
                Handler::Other => ("__other__", config.other_identity.as_str()),
                Handler::Human { key, display } => (key.as_str(), display.as_str()),
            };
            handlers.entry(key, display).record(outcome);

            share.add(&handler);
            if let Some(week) = &week {
                timeline.entry(week.clone()).or_default().add(&handler);
            }
        }
    }

    let rows = |bucket: &AggregateBucket<ComplianceTally>| -> Vec<ComplianceRow> {
        bucket
            .ranked_by(|tally| tally.total as f64, bucket.len())
            .into_iter()
            .map(|entry| ComplianceRow {
                name: entry.label.clone(),
                tally: entry.value.clone(),
            })
            .collect()
    };

    let share_total = share.total() as f64;
    let automation_share = AutomationShare {
        ai_share: round_to(percentage(share.ai as f64, share_total), 2),
        robot_share: round_to(percentage(share.robot as f64, share_total), 2),
        others_share: round_to(percentage(share.others as f64, share_total), 2),
        counts: share,
    };

    let report = SlaReport {
        overall,
        basis,
        by_guide_type: rows(&guide_types),
        by_handler: rows(&handlers),
        weekly_trend: weekly
            .into_iter()
            .map(|(week, tally)| WeeklyCompliance { week, tally })
            .collect(),
        automation_timeline: timeline
            .into_iter()
            .map(|(week, counts)| AutomationWeek { week, counts })
            .collect(),
        automation_share,
        undated_records: undated,
    };

    if report.basis.defaulted > 0 {
        log::info!(
            "{} of {} regulation records had no SLA marking and used the default outcome",
            report.basis.defaulted,
            report.overall.total
        );
    }

    report
}
