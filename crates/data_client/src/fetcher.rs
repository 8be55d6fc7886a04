//! Live SLA of the remote queues.
//!
//! Every configured queue runs in its own task: it authenticates, walks the
//! pages sequentially and classifies the pending items against their deadline.
//! A failing queue yields a failure report without touching its siblings.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use shared::config::QueueApiConfig;
use shared::models::ratios::{percentage, round_to};
use shared::models::{PriorityClass, QueueItem, QueueSpec, RequestType, TrafficLight, resolve_first};

use crate::errors::{ClientError, ClientResult};
use crate::queue_api::QueueApi;

/// Compliance reported when no item is pending: nothing can be overdue.
pub const EMPTY_QUEUE_COMPLIANCE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveStatus {
    OnTrack,
    Approaching,
    Overdue,
}

/// Explicit deadline, else submission plus the queue's allowed hours.
///
/// A derived deadline outside chrono's range counts as missing.
pub fn item_deadline(item: &QueueItem, queue: &QueueSpec) -> Option<DateTime<Utc>> {
    let derived = item.submitted_at.and_then(|submitted| {
        ChronoDuration::try_hours(queue.allowed_hours).and_then(|allowed| submitted.checked_add_signed(allowed))
    });
    resolve_first([item.deadline, derived])
}

pub fn live_status(deadline: DateTime<Utc>, now: DateTime<Utc>, alert_hours: i64) -> LiveStatus {
    let alert = ChronoDuration::try_hours(alert_hours).unwrap_or(ChronoDuration::MAX);
    if deadline <= now {
        LiveStatus::Overdue
    } else if deadline - now <= alert {
        LiveStatus::Approaching
    } else {
        LiveStatus::OnTrack
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueReport {
    pub queue: String,
    pub request_type: RequestType,
    pub priority: PriorityClass,
    /// Pending items of this queue with a resolvable deadline
    pub total: usize,
    /// Not overdue; includes approaching items
    pub compliant: usize,
    pub overdue: usize,
    pub approaching: usize,
    /// Pending items without deadline nor submission date
    pub skipped: usize,
    pub compliance_percentage: f64,
    pub status: TrafficLight,
    pub overdue_items: Vec<String>,
    pub approaching_items: Vec<String>,
    pub pages_fetched: u32,
    /// Pagination stopped early: a failed page after at least one good page,
    /// or the page cap reached while the API reported more pages
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueueReport {
    fn empty(queue: &QueueSpec) -> Self {
        Self {
            queue: queue.name(),
            request_type: queue.request_type,
            priority: queue.priority,
            total: 0,
            compliant: 0,
            overdue: 0,
            approaching: 0,
            skipped: 0,
            compliance_percentage: EMPTY_QUEUE_COMPLIANCE,
            status: TrafficLight::Healthy,
            overdue_items: Vec::new(),
            approaching_items: Vec::new(),
            pages_fetched: 0,
            partial: false,
            error: None,
        }
    }

    pub fn failed(queue: &QueueSpec, error: &ClientError) -> Self {
        Self {
            compliance_percentage: 0.0,
            status: TrafficLight::Critical,
            error: Some(error.to_string()),
            ..Self::empty(queue)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Classifies the items that belong to `queue` and are still in analysis.
    pub fn classify(queue: &QueueSpec, items: &[QueueItem], now: DateTime<Utc>) -> Self {
        let mut report = Self::empty(queue);
        let pending = items
            .iter()
            .filter(|item| item.is_in_analysis() && item.priority_class() == queue.priority);

        for item in pending {
            let Some(deadline) = item_deadline(item, queue) else {
                report.skipped += 1;
                continue;
            };
            report.total += 1;
            match live_status(deadline, now, queue.alert_hours) {
                LiveStatus::Overdue => {
                    report.overdue += 1;
                    report.overdue_items.push(item.identifier().to_string());
                }
                LiveStatus::Approaching => {
                    report.compliant += 1;
                    report.approaching += 1;
                    report.approaching_items.push(item.identifier().to_string());
                }
                LiveStatus::OnTrack => report.compliant += 1,
            }
        }

        if report.total > 0 {
            report.compliance_percentage = round_to(percentage(report.compliant as f64, report.total as f64), 2);
        }
        report.status = TrafficLight::from_percentage(report.compliance_percentage);
        report
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveSlaSummary {
    pub total: usize,
    pub compliant: usize,
    pub overdue: usize,
    pub approaching: usize,
    pub compliance_percentage: f64,
    pub status: TrafficLight,
    pub failed_queues: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveSlaResponse {
    pub generated_at: DateTime<Utc>,
    pub summary: LiveSlaSummary,
    pub queues: Vec<QueueReport>,
}

impl LiveSlaResponse {
    fn new(generated_at: DateTime<Utc>, queues: Vec<QueueReport>) -> Self {
        let healthy: Vec<&QueueReport> = queues.iter().filter(|report| !report.is_failed()).collect();
        let total: usize = healthy.iter().map(|report| report.total).sum();
        let compliant: usize = healthy.iter().map(|report| report.compliant).sum();
        let compliance_percentage = if total > 0 {
            round_to(percentage(compliant as f64, total as f64), 2)
        } else {
            EMPTY_QUEUE_COMPLIANCE
        };

        let summary = LiveSlaSummary {
            total,
            compliant,
            overdue: healthy.iter().map(|report| report.overdue).sum(),
            approaching: healthy.iter().map(|report| report.approaching).sum(),
            compliance_percentage,
            status: TrafficLight::from_percentage(compliance_percentage),
            failed_queues: queues.len() - healthy.len(),
        };
        Self {
            generated_at,
            summary,
            queues,
        }
    }

    /// True when there were queues to monitor and every one of them failed.
    pub fn all_failed(&self) -> bool {
        !self.queues.is_empty() && self.summary.failed_queues == self.queues.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Pagination {
    delay: Duration,
    max_pages: u32,
}

struct Collected {
    items: Vec<QueueItem>,
    pages: u32,
    partial: bool,
}

async fn collect_items(api: &dyn QueueApi, queue: &QueueSpec, pagination: Pagination) -> ClientResult<Collected> {
    let token = api.authenticate().await?;
    let name = queue.name();

    let mut items = Vec::new();
    let mut page: u32 = 1;
    let mut pages: u32 = 0;
    let mut partial = false;
    loop {
        match api.fetch_page(&token, queue, page).await {
            Ok(result) => {
                log::debug!("{}: page {} of {} with {} items", name, page, result.total_pages, result.data.len());
                pages += 1;
                items.extend(result.data);
                if page >= result.total_pages {
                    break;
                }
                if page >= pagination.max_pages {
                    log::warn!(
                        "{}: page cap {} reached, {} pages reported by the API",
                        name,
                        pagination.max_pages,
                        result.total_pages
                    );
                    partial = true;
                    break;
                }
            }
            // Nothing fetched yet: the queue has no data to report.
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                log::warn!("{}: stopping at page {} and keeping {} items: {}", name, page, items.len(), e);
                partial = true;
                break;
            }
        }
        page += 1;
        tokio::time::sleep(pagination.delay).await;
    }

    Ok(Collected { items, pages, partial })
}

async fn monitor_queue(
    api: Arc<dyn QueueApi>,
    queue: QueueSpec,
    pagination: Pagination,
    now: DateTime<Utc>,
) -> ClientResult<QueueReport> {
    let collected = collect_items(api.as_ref(), &queue, pagination).await?;
    let mut report = QueueReport::classify(&queue, &collected.items, now);
    report.pages_fetched = collected.pages;
    report.partial = collected.partial;
    log::info!(
        "{}: {} pending, {} overdue, {:.2}% compliant",
        report.queue,
        report.total,
        report.overdue,
        report.compliance_percentage
    );
    Ok(report)
}

pub async fn monitor_queues(api: Arc<dyn QueueApi>, config: &QueueApiConfig) -> LiveSlaResponse {
    monitor_queues_at(api, config, Utc::now()).await
}

/// Runs one fetch cycle, classifying deadlines against `now`.
pub async fn monitor_queues_at(api: Arc<dyn QueueApi>, config: &QueueApiConfig, now: DateTime<Utc>) -> LiveSlaResponse {
    let pagination = Pagination {
        delay: Duration::from_millis(config.page_delay_ms),
        max_pages: config.max_pages,
    };

    let handles: Vec<_> = config
        .queues
        .iter()
        .map(|queue| {
            let api = Arc::clone(&api);
            let queue = queue.clone();
            tokio::spawn(monitor_queue(api, queue, pagination, now))
        })
        .collect();

    let reports = join_all(handles)
        .await
        .into_iter()
        .zip(&config.queues)
        .map(|(joined, queue)| {
            let outcome = joined.unwrap_or_else(|e| Err(ClientError::TaskFailed(e.to_string())));
            outcome.unwrap_or_else(|e| {
                log::error!("{}: {}", queue.name(), e);
                QueueReport::failed(queue, &e)
            })
        })
        .collect();

    LiveSlaResponse::new(now, reports)
}
