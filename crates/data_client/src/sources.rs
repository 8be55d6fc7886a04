//! Read-only record sources feeding the dashboards.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use shared::models::{ClaimRecord, DateRange, RegulationRecord};
use shared::SharedError;

use crate::errors::ClientResult;

/// Query collaborator behind every dashboard.
#[async_trait]
pub trait ClaimSource: Send + Sync {
    /// Audited claims whose period date falls in `range`, optionally narrowed
    /// by a free-text search on guide number, provider and auditor.
    async fn audit_claims(&self, range: &DateRange, search: Option<&str>) -> ClientResult<Vec<ClaimRecord>>;

    /// Regulated guides whose regulation (or request) date falls in `range`.
    async fn regulation_records(&self, range: &DateRange) -> ClientResult<Vec<RegulationRecord>>;
}

/// Reads exported query results from JSON files.
///
/// Each file holds an array of records, or an object carrying the array under
/// `data`/`dados`/`registros`. Records that do not deserialize are skipped.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    claims_path: Option<PathBuf>,
    regulation_path: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claims(mut self, path: impl Into<PathBuf>) -> Self {
        self.claims_path = Some(path.into());
        self
    }

    pub fn with_regulation(mut self, path: impl Into<PathBuf>) -> Self {
        self.regulation_path = Some(path.into());
        self
    }
}

#[async_trait]
impl ClaimSource for JsonFileSource {
    async fn audit_claims(&self, range: &DateRange, search: Option<&str>) -> ClientResult<Vec<ClaimRecord>> {
        let path = required(&self.claims_path, "claims")?;
        let records: Vec<ClaimRecord> = read_records(path).await?;
        let total = records.len();

        let selected: Vec<ClaimRecord> = records
            .into_iter()
            .filter(|record| range.contains(record.period_date()))
            .filter(|record| search.is_none_or(|needle| record.matches_search(needle)))
            .collect();

        log::info!("Loaded {} of {} claims from {}", selected.len(), total, path.display());
        Ok(selected)
    }

    async fn regulation_records(&self, range: &DateRange) -> ClientResult<Vec<RegulationRecord>> {
        let path = required(&self.regulation_path, "regulation")?;
        let records: Vec<RegulationRecord> = read_records(path).await?;
        let total = records.len();

        let selected: Vec<RegulationRecord> = records
            .into_iter()
            .filter(|record| range.contains(record.timeline_date()))
            .collect();

        log::info!("Loaded {} of {} regulation records from {}", selected.len(), total, path.display());
        Ok(selected)
    }
}

fn required<'a>(path: &'a Option<PathBuf>, kind: &str) -> ClientResult<&'a Path> {
    path.as_deref()
        .ok_or_else(|| SharedError::Config(format!("no {} file configured", kind)).into())
}

async fn read_records<T: DeserializeOwned>(path: &Path) -> ClientResult<Vec<T>> {
    let content = tokio::fs::read_to_string(path).await.map_err(SharedError::from)?;
    let document: Value = serde_json::from_str(&content).map_err(SharedError::from)?;

    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(mut object) => ["data", "dados", "registros"]
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(rows)) => Some(rows),
                _ => None,
            })
            .ok_or_else(|| SharedError::Config(format!("{} holds no record array", path.display())))?,
        _ => {
            return Err(SharedError::Config(format!("{} holds no record array", path.display())).into());
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for (position, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<T>(row) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping record {} of {}: {}", position, path.display(), e),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_json(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_claims_filtered_by_range_and_search() {
        let file = write_json(
            r#"[
                {"guia": "G-1", "prestador": "Hospital São Lucas", "data_auditoria": "2024-03-05"},
                {"guia": "G-2", "prestador": "Clínica Vida", "data_auditoria": "2024-03-20"},
                {"guia": "G-3", "prestador": "Hospital Sao Lucas", "data_auditoria": "2024-05-01"},
                "not a record"
            ]"#,
        );
        let source = JsonFileSource::new().with_claims(file.path());
        let march = DateRange::new(NaiveDate::from_ymd_opt(2024, 3, 1), NaiveDate::from_ymd_opt(2024, 3, 31)).unwrap();

        let all_march = source.audit_claims(&march, None).await.unwrap();
        assert_eq!(all_march.len(), 2);

        let lucas = source.audit_claims(&march, Some("sao lucas")).await.unwrap();
        assert_eq!(lucas.len(), 1);
        assert_eq!(lucas[0].guide_number, "G-1");

        let everything = source.audit_claims(&DateRange::default(), Some("SÃO LUCAS")).await.unwrap();
        assert_eq!(everything.len(), 2);
    }

    #[tokio::test]
    async fn test_regulation_records_from_wrapped_object() {
        let file = write_json(
            r#"{"dados": [
                {"guia": "R-1", "data_regulacao": "2024-03-05"},
                {"guia": "R-2", "data_solicitacao": "2024-04-02"},
                {"guia": "R-3"}
            ]}"#,
        );
        let source = JsonFileSource::new().with_regulation(file.path());

        let unbounded = source.regulation_records(&DateRange::default()).await.unwrap();
        assert_eq!(unbounded.len(), 3);

        let april = DateRange::new(NaiveDate::from_ymd_opt(2024, 4, 1), None).unwrap();
        let records = source.regulation_records(&april).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].guide_number, "R-2");
    }

    #[tokio::test]
    async fn test_missing_configuration_and_files_are_errors() {
        let source = JsonFileSource::new();
        let result = source.audit_claims(&DateRange::default(), None).await;
        assert!(matches!(result, Err(ClientError::Source(SharedError::Config(_)))));

        let source = JsonFileSource::new().with_regulation("/nonexistent/regulacao.json");
        let result = source.regulation_records(&DateRange::default()).await;
        assert!(matches!(result, Err(ClientError::Source(SharedError::Io(_)))));

        let file = write_json(r#"{"total": 3}"#);
        let source = JsonFileSource::new().with_claims(file.path());
        assert!(source.audit_claims(&DateRange::default(), None).await.is_err());
    }
}
