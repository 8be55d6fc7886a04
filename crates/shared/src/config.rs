//! Runtime configuration for the dashboards and the queue monitor.
//!
//! Defaults cover every field; a JSON file may override any subset and a few
//! environment variables override the queue API connection settings.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::errors::{SharedError, SharedResult};
use crate::models::queue::QueueSpec;

pub const ENV_BASE_URL: &str = "QUEUE_API_BASE_URL";
pub const ENV_AUTH_URL: &str = "QUEUE_API_AUTH_URL";
pub const ENV_CLIENT_ID: &str = "QUEUE_API_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "QUEUE_API_CLIENT_SECRET";
pub const ENV_PAGE_DELAY_MS: &str = "QUEUE_API_PAGE_DELAY_MS";

/// Denial reasons that mean "no reason given"; compared after normalization.
pub const DEFAULT_PLACEHOLDER_REASONS: &[&str] = &[
    "",
    "-",
    "n/a",
    "na",
    "n/d",
    "nd",
    "null",
    "none",
    "undefined",
    "nao informado",
    "nao informada",
    "sem motivo",
    "sem motivo informado",
    "sem justificativa",
    "nao se aplica",
    "nenhum",
    "nenhuma",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Size of every top-N ranking
    pub top_n: usize,
    /// Number of most recent monthly periods kept in the time series
    pub months: usize,
    /// Stays longer than this are soft-flagged, never excluded
    pub long_stay_days: i64,
    pub placeholder_reasons: Vec<String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            months: 6,
            long_stay_days: 365,
            placeholder_reasons: DEFAULT_PLACEHOLDER_REASONS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaConfig {
    /// Outcome for records with no status flag and no auto-regulation
    pub default_compliant: bool,
    /// Display name of the automated decision engine
    pub ai_identity: String,
    /// Display name of the robotic human accounts bucket
    pub robot_identity: String,
    /// Handler names (any spelling) that belong to robotic accounts
    pub robotic_aliases: Vec<String>,
    /// Display name for records with no handler and no automation
    pub other_identity: String,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            default_compliant: true,
            ai_identity: "IA".to_string(),
            robot_identity: "Robô".to_string(),
            robotic_aliases: vec![
                "robo".to_string(),
                "robo regulacao".to_string(),
                "usuario robo".to_string(),
                "rpa".to_string(),
                "integracao automatica".to_string(),
            ],
            other_identity: "Outros".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueApiConfig {
    pub base_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Path of the listing endpoint, relative to `base_url`
    pub queue_path: String,
    pub page_size: u32,
    pub page_delay_ms: u64,
    /// Hard cap on pages per queue regardless of what the API reports
    pub max_pages: u32,
    pub timeout_secs: u64,
    pub queues: Vec<QueueSpec>,
}

impl Default for QueueApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            auth_url: "http://localhost:8080/auth/token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            queue_path: "solicitacoes".to_string(),
            page_size: 100,
            page_delay_ms: 300,
            max_pages: 200,
            timeout_secs: 30,
            queues: QueueSpec::default_queues(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub aggregation: AggregationConfig,
    pub sla: SlaConfig,
    pub queue_api: QueueApiConfig,
}

impl DashboardConfig {
    /// Reads an optional JSON file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> SharedResult<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from a key lookup (the process environment in `load`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> SharedResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = &mut self.queue_api;
        if let Some(value) = lookup(ENV_BASE_URL) {
            api.base_url = value;
        }
        if let Some(value) = lookup(ENV_AUTH_URL) {
            api.auth_url = value;
        }
        if let Some(value) = lookup(ENV_CLIENT_ID) {
            api.client_id = value;
        }
        if let Some(value) = lookup(ENV_CLIENT_SECRET) {
            api.client_secret = value;
        }
        if let Some(value) = lookup(ENV_PAGE_DELAY_MS) {
            api.page_delay_ms = value
                .trim()
                .parse()
                .map_err(|_| SharedError::Config(format!("{} must be an integer, got '{}'", ENV_PAGE_DELAY_MS, value)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> SharedResult<()> {
        if self.aggregation.top_n == 0 {
            return Err(SharedError::Config("aggregation.top_n must be at least 1".to_string()));
        }
        if self.aggregation.months == 0 {
            return Err(SharedError::Config("aggregation.months must be at least 1".to_string()));
        }
        for queue in &self.queue_api.queues {
            if queue.allowed_hours <= 0 || queue.alert_hours < 0 {
                return Err(SharedError::Config(format!("invalid hours for queue {}", queue.name())));
            }
        }
        Ok(())
    }
}
