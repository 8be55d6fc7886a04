use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{SharedError, SharedResult};

/// Mapping of month numbers to Portuguese month names
pub static MONTHS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    let mut months = HashMap::new();
    months.insert(1, "Janeiro");
    months.insert(2, "Fevereiro");
    months.insert(3, "Março");
    months.insert(4, "Abril");
    months.insert(5, "Maio");
    months.insert(6, "Junho");
    months.insert(7, "Julho");
    months.insert(8, "Agosto");
    months.insert(9, "Setembro");
    months.insert(10, "Outubro");
    months.insert(11, "Novembro");
    months.insert(12, "Dezembro");
    months
});

const SECONDS_PER_DAY: i64 = 86_400;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Converts month number to Portuguese month name.
///
/// # Example
/// ```rust
/// use shared::models::date_utils::get_month;
///
/// assert_eq!(get_month(1).unwrap(), "Janeiro");
/// assert_eq!(get_month(12).unwrap(), "Dezembro");
/// ```
pub fn get_month(month: u32) -> SharedResult<&'static str> {
    MONTHS
        .get(&month)
        .copied()
        .ok_or_else(|| SharedError::InvalidDate(format!("Mês deve estar entre 1 e 12, recebido {}", month)))
}

/// Formats a date label in Portuguese
///
/// # Example
/// ```rust
/// use shared::models::date_utils::format_date_label;
///
/// assert_eq!(format_date_label(1, 2024).unwrap(), "Janeiro/2024");
/// ```
pub fn format_date_label(month: u32, year: i32) -> SharedResult<String> {
    let month_name = get_month(month)?;
    Ok(format!("{}/{}", month_name, year))
}

/// Parses the timestamp shapes found in claim exports and queue payloads.
///
/// Accepts RFC 3339, naive date-times (read as UTC), offsets without minutes
/// (`+00`), ISO dates and Brazilian `dd/mm/yyyy` dates. Returns `None` for
/// anything else instead of failing the record.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sunday starting the week that contains `timestamp`, taken in UTC.
pub fn week_start(timestamp: DateTime<Utc>) -> NaiveDate {
    let date = timestamp.date_naive();
    let days_since_sunday = date.weekday().num_days_from_sunday() as i64;
    date - Duration::days(days_since_sunday)
}

/// Week bucket key (`YYYY-MM-DD` of the week's Sunday).
///
/// # Example
/// ```rust
/// use shared::models::date_utils::{parse_timestamp, week_key};
///
/// let wednesday = parse_timestamp("2024-03-13").unwrap();
/// assert_eq!(week_key(wednesday), "2024-03-10");
/// ```
pub fn week_key(timestamp: DateTime<Utc>) -> String {
    week_start(timestamp).format("%Y-%m-%d").to_string()
}

/// Week bucket key straight from a date string.
pub fn week_key_from_str(text: &str) -> Option<String> {
    parse_timestamp(text).map(week_key)
}

/// Month bucket key (`YYYY-MM`); sorts chronologically as a string.
pub fn month_key(timestamp: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", timestamp.year(), timestamp.month())
}

/// Portuguese label for a `YYYY-MM` key, e.g. `Março/2024`.
pub fn month_label(key: &str) -> Option<String> {
    let (year, month) = key.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    format_date_label(month, year).ok()
}

/// Whole days between admission and discharge, rounded up.
///
/// Returns `None` when the discharge happens before the admission.
pub fn length_of_stay_days(admission: DateTime<Utc>, discharge: DateTime<Utc>) -> Option<i64> {
    let seconds = (discharge - admission).num_seconds();
    if seconds < 0 {
        return None;
    }
    Some((seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY)
}

/// Inclusive date filter applied by record sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> SharedResult<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(SharedError::InvalidDate(format!(
                    "intervalo invertido: {} > {}",
                    start, end
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Unbounded ranges accept undated records; bounded ones reject them.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(timestamp) = timestamp else {
            return false;
        };
        let date = timestamp.date_naive();
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> DateTime<Utc> {
        parse_timestamp(text).unwrap()
    }

    #[test]
    fn test_months_mapping() {
        assert_eq!(MONTHS.get(&1), Some(&"Janeiro"));
        assert_eq!(MONTHS.get(&12), Some(&"Dezembro"));
        assert_eq!(MONTHS.get(&13), None);
    }

    #[test]
    fn test_get_month() {
        assert_eq!(get_month(3).unwrap(), "Março");
        assert!(get_month(0).is_err());
        assert!(get_month(13).is_err());
    }

    #[test]
    fn test_format_date_label() {
        assert_eq!(format_date_label(12, 2023).unwrap(), "Dezembro/2023");
        assert!(format_date_label(13, 2024).is_err());
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        for text in [
            "2024-01-15",
            "15/01/2024",
            "2024-01-15T10:30:00",
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:30:00.000Z",
            "2024-01-15 10:30:00+00",
            "15/01/2024 10:30",
        ] {
            assert_eq!(ts(text).date_naive(), expected, "failed for {}", text);
        }
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("ontem").is_none());
    }

    #[test]
    fn test_offset_is_converted_to_utc() {
        // 22:00 at -03:00 is already the next day in UTC
        let parsed = ts("2024-03-09T22:00:00-03:00");
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(week_key(parsed), "2024-03-10");
    }

    #[test]
    fn test_week_key_same_span() {
        // 2024-03-10 is a Sunday, 2024-03-16 the following Saturday
        let days = ["2024-03-10", "2024-03-11", "2024-03-13T23:59:59Z", "2024-03-16"];
        for day in days {
            assert_eq!(week_key_from_str(day).unwrap(), "2024-03-10", "failed for {}", day);
        }
        assert_eq!(week_key_from_str("2024-03-17").unwrap(), "2024-03-17");
        assert_eq!(week_key_from_str("2024-03-09").unwrap(), "2024-03-03");
    }

    #[test]
    fn test_week_key_crosses_year() {
        assert_eq!(week_key_from_str("2025-01-01").unwrap(), "2024-12-29");
    }

    #[test]
    fn test_month_key_and_label() {
        let key = month_key(ts("2024-03-31T23:00:00Z"));
        assert_eq!(key, "2024-03");
        assert_eq!(month_label(&key).unwrap(), "Março/2024");
        assert!(month_label("2024").is_none());
    }

    #[test]
    fn test_length_of_stay_rounds_up() {
        assert_eq!(length_of_stay_days(ts("2024-01-01"), ts("2024-01-05")), Some(4));
        assert_eq!(
            length_of_stay_days(ts("2024-01-01T08:00:00"), ts("2024-01-02T09:00:00")),
            Some(2)
        );
        assert_eq!(length_of_stay_days(ts("2024-01-01"), ts("2024-01-01")), Some(0));
        assert_eq!(length_of_stay_days(ts("2024-01-05"), ts("2024-01-01")), None);
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 1), NaiveDate::from_ymd_opt(2024, 1, 31)).unwrap();
        assert!(range.contains(Some(ts("2024-01-31T23:59:00Z"))));
        assert!(!range.contains(Some(ts("2024-02-01"))));
        assert!(!range.contains(None));
        assert!(DateRange::default().contains(None));
        assert!(DateRange::new(NaiveDate::from_ymd_opt(2024, 2, 1), NaiveDate::from_ymd_opt(2024, 1, 1)).is_err());
    }
}
