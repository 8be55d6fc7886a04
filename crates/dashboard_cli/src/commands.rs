//! One request/response cycle per invocation, always ending in an envelope.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use data_client::{ClaimSource, ClientError, ClientResult, HttpQueueApi, JsonFileSource, LiveSlaResponse, monitor_queues};
use etl_pipeline::{build_audit_dashboard, build_billing_dashboard, build_faturamento_dashboard};
use shared::config::DashboardConfig;
use shared::models::{ApiResponse, DateRange};

use crate::cli::{Command, FilterArgs};

pub async fn execute(command: &Command, config: &DashboardConfig) -> ApiResponse<Value> {
    let result = match command {
        Command::Audit { claims, filters } => {
            let source = JsonFileSource::new().with_claims(claims);
            audit(&source, filters, config).await
        }
        Command::Billing {
            regulation,
            claims,
            filters,
        } => {
            let source = JsonFileSource::new().with_claims(claims).with_regulation(regulation);
            billing(&source, filters, config).await
        }
        Command::Faturamento { claims, filters } => {
            let source = JsonFileSource::new().with_claims(claims);
            faturamento(&source, filters, config).await
        }
        Command::Queues => queues(config).await,
    };

    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            log::error!("Request failed: {}", e);
            ApiResponse::failure(e.to_string())
        }
    }
}

fn date_range(filters: &FilterArgs) -> ClientResult<DateRange> {
    Ok(DateRange::new(filters.from, filters.to)?)
}

fn to_value<T: Serialize>(data: &T) -> ClientResult<Value> {
    serde_json::to_value(data).map_err(|e| ClientError::Source(e.into()))
}

pub async fn audit(source: &dyn ClaimSource, filters: &FilterArgs, config: &DashboardConfig) -> ClientResult<Value> {
    let range = date_range(filters)?;
    let claims = source.audit_claims(&range, filters.search.as_deref()).await?;
    to_value(&build_audit_dashboard(&claims, config))
}

/// Both reads run concurrently; either failing fails the dashboard.
pub async fn billing(source: &dyn ClaimSource, filters: &FilterArgs, config: &DashboardConfig) -> ClientResult<Value> {
    let range = date_range(filters)?;
    let (regulation, claims) = tokio::join!(
        source.regulation_records(&range),
        source.audit_claims(&range, filters.search.as_deref())
    );
    to_value(&build_billing_dashboard(&regulation?, &claims?, config))
}

pub async fn faturamento(source: &dyn ClaimSource, filters: &FilterArgs, config: &DashboardConfig) -> ClientResult<Value> {
    let range = date_range(filters)?;
    let claims = source.audit_claims(&range, filters.search.as_deref()).await?;
    to_value(&build_faturamento_dashboard(&claims, config))
}

pub async fn queues(config: &DashboardConfig) -> ClientResult<Value> {
    let api = Arc::new(HttpQueueApi::new(config.queue_api.clone())?);
    let response: LiveSlaResponse = monitor_queues(api, &config.queue_api).await;
    if response.all_failed() {
        let reasons: Vec<String> = response
            .queues
            .iter()
            .filter_map(|report| report.error.as_ref().map(|e| format!("{}: {}", report.queue, e)))
            .collect();
        return Err(ClientError::TaskFailed(reasons.join("; ")));
    }
    to_value(&response)
}
