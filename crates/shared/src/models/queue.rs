use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::normalize::{handler_key, normalize_key, resolve_text};

/// Kind of authorization request handled by a remote queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Internacao,
    Sadt,
}

impl RequestType {
    pub const ALL: [RequestType; 2] = [RequestType::Internacao, RequestType::Sadt];

    pub fn label(&self) -> &'static str {
        match self {
            RequestType::Internacao => "Internação",
            RequestType::Sadt => "SP/SADT",
        }
    }

    /// Value sent as the `tipo` query parameter.
    pub fn api_code(&self) -> &'static str {
        match self {
            RequestType::Internacao => "INTERNACAO",
            RequestType::Sadt => "SADT",
        }
    }
}

/// Priority class governing the allowed processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    Eletiva,
    Urgencia,
}

/// Queue-name tokens to priority class, checked in order.
pub const PRIORITY_TOKENS: &[(&str, PriorityClass)] = &[
    ("urgencia", PriorityClass::Urgencia),
    ("urgente", PriorityClass::Urgencia),
    ("emergencia", PriorityClass::Urgencia),
    ("pronto atendimento", PriorityClass::Urgencia),
    ("eletiva", PriorityClass::Eletiva),
    ("eletivo", PriorityClass::Eletiva),
    ("eletivas", PriorityClass::Eletiva),
];

impl PriorityClass {
    pub const ALL: [PriorityClass; 2] = [PriorityClass::Eletiva, PriorityClass::Urgencia];

    /// Infers the class from a free-text queue name.
    ///
    /// Single-word tokens must match a whole word of the name; multi-word
    /// tokens must appear as a phrase. Names matching nothing are `Eletiva`.
    pub fn infer(queue_name: &str) -> Self {
        let key = handler_key(queue_name);
        let words: Vec<&str> = key.split(' ').collect();
        PRIORITY_TOKENS
            .iter()
            .find(|(token, _)| {
                if token.contains(' ') {
                    key.contains(token)
                } else {
                    words.contains(token)
                }
            })
            .map(|(_, class)| *class)
            .unwrap_or(PriorityClass::Eletiva)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityClass::Eletiva => "Eletiva",
            PriorityClass::Urgencia => "Urgência",
        }
    }
}

/// One logical queue monitored for live SLA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSpec {
    pub request_type: RequestType,
    pub priority: PriorityClass,
    /// Processing time allowed from submission when no explicit deadline is given.
    pub allowed_hours: i64,
    /// Remaining time at or below which a compliant item is flagged as approaching.
    pub alert_hours: i64,
}

impl QueueSpec {
    pub fn new(request_type: RequestType, priority: PriorityClass) -> Self {
        let (allowed_hours, alert_hours) = match (request_type, priority) {
            (RequestType::Internacao, PriorityClass::Eletiva) => (21 * 24, 72),
            (RequestType::Sadt, PriorityClass::Eletiva) => (10 * 24, 48),
            (_, PriorityClass::Urgencia) => (6, 2),
        };
        Self {
            request_type,
            priority,
            allowed_hours,
            alert_hours,
        }
    }

    /// Cross product of request types and priority classes.
    pub fn default_queues() -> Vec<Self> {
        RequestType::ALL
            .iter()
            .flat_map(|request_type| {
                PriorityClass::ALL
                    .iter()
                    .map(move |priority| QueueSpec::new(*request_type, *priority))
            })
            .collect()
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.request_type.label(), self.priority.label())
    }
}

/// Statuses still waiting for a decision.
const IN_ANALYSIS_STATUSES: &[&str] = &["em analise", "em reanalise", "em re-analise", "em re analise"];

/// A pending request as reported by the remote queue API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueItem {
    #[serde(alias = "protocolo", deserialize_with = "lenient::text")]
    pub protocol: String,
    #[serde(alias = "numero_guia", alias = "numeroGuia", deserialize_with = "lenient::text")]
    pub guide_number: String,
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(alias = "situacao", deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(alias = "fila", alias = "nome_fila", alias = "nomeFila", deserialize_with = "lenient::text")]
    pub queue_name: String,
    #[serde(
        alias = "data_solicitacao",
        alias = "dataSolicitacao",
        alias = "created_at",
        deserialize_with = "lenient::opt_timestamp"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(alias = "prazo", alias = "prazo_sla", alias = "sla_deadline", deserialize_with = "lenient::opt_timestamp")]
    pub deadline: Option<DateTime<Utc>>,
}

impl QueueItem {
    /// Protocol, then guide number, then id.
    pub fn identifier(&self) -> &str {
        resolve_text(
            [
                Some(self.protocol.as_str()),
                Some(self.guide_number.as_str()),
                Some(self.id.as_str()),
            ],
            "sem-identificador",
        )
    }

    pub fn is_in_analysis(&self) -> bool {
        IN_ANALYSIS_STATUSES.contains(&normalize_key(&self.status).as_str())
    }

    pub fn priority_class(&self) -> PriorityClass {
        PriorityClass::infer(&self.queue_name)
    }
}

/// One page of the remote queue listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueuePage {
    #[serde(alias = "items", alias = "content", alias = "dados", deserialize_with = "lenient::skip_invalid")]
    pub data: Vec<QueueItem>,
    #[serde(alias = "totalPages", alias = "last_page", alias = "total_paginas", deserialize_with = "lenient::count")]
    pub total_pages: u32,
}

/// Traffic-light status derived from a compliance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Healthy,
    Warning,
    Critical,
}

impl TrafficLight {
    pub const HEALTHY_THRESHOLD: f64 = 98.0;
    pub const WARNING_THRESHOLD: f64 = 90.0;

    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= Self::HEALTHY_THRESHOLD {
            TrafficLight::Healthy
        } else if percentage >= Self::WARNING_THRESHOLD {
            TrafficLight::Warning
        } else {
            TrafficLight::Critical
        }
    }
}
