//! Forgiving `deserialize_with` helpers for exported records.
//!
//! Query results arrive with numbers as strings, Brazilian decimal commas,
//! nulls where values are expected and flags spelled a dozen ways. None of
//! that may fail a record, so every helper falls back to a neutral value.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::date_utils::parse_timestamp;

/// Parses a monetary or quantity string: `1234.56`, `1.234,56`, `1234,56`,
/// `1.234.567`, `R$ 10`.
///
/// Without a comma, dots that split the digits into groups of three (first
/// group 1 to 3 digits, not starting with zero) are thousands separators.
pub fn parse_decimal_str(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        (None, Some(_)) if is_dot_grouped(&cleaned) => cleaned.replace('.', ""),
        _ => cleaned,
    };
    normalized.parse::<f64>().ok()
}

fn is_dot_grouped(text: &str) -> bool {
    let mut groups = text.split('.');
    let leading_ok = groups.next().is_some_and(|first| {
        (1..=3).contains(&first.len()) && !first.starts_with('0') && first.chars().all(|c| c.is_ascii_digit())
    });
    leading_ok && groups.all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()))
}

/// Non-negative finite amount from any JSON value; everything else is zero.
pub fn amount_from_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let parsed = parse_decimal_str(text);
            if parsed.is_none() && !text.trim().is_empty() {
                log::warn!("Unreadable amount {:?} counted as zero", text);
            }
            parsed
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0)
}

pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(amount_from_value).unwrap_or(0.0))
}

pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    })
}

pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = text(deserializer)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

pub fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => parse_timestamp(&text),
        Some(Value::Number(number)) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => matches!(
            text.trim().to_lowercase().as_str(),
            "true" | "1" | "s" | "sim" | "y" | "yes"
        ),
        _ => false,
    })
}

/// Names from an array of strings, an array of `{nome|name}` objects or a
/// single `,`/`;` separated string.
pub fn name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let names = match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.clone()),
                Value::Object(map) => map
                    .get("nome")
                    .or_else(|| map.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect(),
        Some(Value::String(joined)) => joined.split([',', ';']).map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Whole count (page totals and the like); invalid values are zero.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = value.as_ref().map(amount_from_value).unwrap_or(0.0);
    Ok(parsed.min(u32::MAX as f64) as u32)
}

/// A list whose malformed elements are dropped instead of failing the whole list.
pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = entries.len();
    let parsed: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if parsed.len() < total {
        log::warn!("Skipped {} malformed entries out of {}", total - parsed.len(), total);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "amount")]
        value: f64,
        #[serde(default, deserialize_with = "flag")]
        auto: bool,
        #[serde(default, deserialize_with = "name_list")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "opt_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    fn parse_holder(value: Value) -> Holder {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_decimal_str_formats() {
        assert_eq!(parse_decimal_str("1234.56"), Some(1234.56));
        assert_eq!(parse_decimal_str("1.234,56"), Some(1234.56));
        assert_eq!(parse_decimal_str("1,234.56"), Some(1234.56));
        assert_eq!(parse_decimal_str("1234,5"), Some(1234.5));
        assert_eq!(parse_decimal_str("R$ 10"), Some(10.0));
        assert_eq!(parse_decimal_str(""), None);
        assert_eq!(parse_decimal_str("abc"), None);
    }

    #[test]
    fn test_dot_thousands_without_decimal_comma() {
        assert_eq!(parse_decimal_str("1.234.567"), Some(1234567.0));
        assert_eq!(parse_decimal_str("1.500"), Some(1500.0));
        assert_eq!(parse_decimal_str("R$ 12.000"), Some(12000.0));
        assert_eq!(parse_decimal_str("0.500"), Some(0.5));
        assert_eq!(parse_decimal_str("1234.567"), Some(1234.567));
        assert_eq!(parse_decimal_str("1.5"), Some(1.5));
        assert_eq!(parse_holder(json!({"value": "1.234.567"})).value, 1234567.0);
    }

    #[test]
    fn test_amount_defaults_to_zero() {
        assert_eq!(parse_holder(json!({})).value, 0.0);
        assert_eq!(parse_holder(json!({"value": null})).value, 0.0);
        assert_eq!(parse_holder(json!({"value": "n/d"})).value, 0.0);
        assert_eq!(parse_holder(json!({"value": -5})).value, 0.0);
        assert_eq!(parse_holder(json!({"value": [1]})).value, 0.0);
        assert_eq!(parse_holder(json!({"value": "250,10"})).value, 250.1);
        assert_eq!(parse_holder(json!({"value": 99.5})).value, 99.5);
    }

    #[test]
    fn test_flag_spellings() {
        assert!(parse_holder(json!({"auto": true})).auto);
        assert!(parse_holder(json!({"auto": "S"})).auto);
        assert!(parse_holder(json!({"auto": 1})).auto);
        assert!(!parse_holder(json!({"auto": "N"})).auto);
        assert!(!parse_holder(json!({"auto": null})).auto);
    }

    #[test]
    fn test_name_list_shapes() {
        assert_eq!(parse_holder(json!({"names": ["Ana", " ", "Rui"]})).names, vec!["Ana", "Rui"]);
        assert_eq!(parse_holder(json!({"names": [{"nome": "Ana"}, {"name": "Rui"}]})).names, vec!["Ana", "Rui"]);
        assert_eq!(parse_holder(json!({"names": "Ana; Rui,"})).names, vec!["Ana", "Rui"]);
        assert!(parse_holder(json!({"names": null})).names.is_empty());
    }

    #[derive(Debug, Deserialize)]
    struct Page {
        #[serde(default, deserialize_with = "count")]
        total: u32,
        #[serde(default, deserialize_with = "skip_invalid")]
        rows: Vec<Holder>,
    }

    #[test]
    fn test_count_and_skip_invalid() {
        let page: Page = serde_json::from_value(json!({
            "total": "3",
            "rows": [{"value": 1}, "not an object", {"value": "2,5"}]
        }))
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[1].value, 2.5);

        let empty: Page = serde_json::from_value(json!({"total": null, "rows": null})).unwrap();
        assert_eq!(empty.total, 0);
        assert!(empty.rows.is_empty());
    }

    #[test]
    fn test_timestamp_from_millis_and_garbage() {
        assert!(parse_holder(json!({"at": 1_700_000_000_000i64})).at.is_some());
        assert!(parse_holder(json!({"at": "amanhã"})).at.is_none());
        assert!(parse_holder(json!({"at": "2024-02-01"})).at.is_some());
    }
}
