//! Serde helpers for request bodies.
//!
//! Strings are trimmed on the way in; dates accept RFC 3339 timestamps as
//! well as plain `YYYY-MM-DD` dates (taken as midnight UTC).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};

/// Trimmed required string
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Trimmed optional string; `null` becomes `None`
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()))
}

/// Field that can be cleared
///
/// Use with `#[serde(default)]`: absent is `None`, `null` or a blank string
/// is `Some(None)`, anything else is `Some(Some(trimmed))`.
pub fn nullable_trimmed<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    ))
}

/// Optional ISO-8601 date or datetime
pub fn datetime_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 date: {}", raw))),
    }
}

/// Parses an ISO-8601 date or datetime into UTC
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(deserialize_with = "trimmed")]
        name: String,

        #[serde(default, deserialize_with = "trimmed_opt")]
        title: Option<String>,

        #[serde(default, deserialize_with = "nullable_trimmed")]
        description: Option<Option<String>>,

        #[serde(default, deserialize_with = "datetime_opt")]
        due: Option<DateTime<Utc>>,
    }

    fn parse(json: &str) -> Result<Body, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_trims_strings() {
        let body = parse(r#"{"name":"  Server Migration  ","title":" x "}"#).unwrap();
        assert_eq!(body.name, "Server Migration");
        assert_eq!(body.title.as_deref(), Some("x"));
    }

    #[test]
    fn test_nullable_distinguishes_absent_and_null() {
        assert_eq!(parse(r#"{"name":"a"}"#).unwrap().description, None);
        assert_eq!(
            parse(r#"{"name":"a","description":null}"#).unwrap().description,
            Some(None)
        );
        assert_eq!(
            parse(r#"{"name":"a","description":"   "}"#).unwrap().description,
            Some(None)
        );
        assert_eq!(
            parse(r#"{"name":"a","description":" notes "}"#).unwrap().description,
            Some(Some("notes".to_string()))
        );
    }

    #[test]
    fn test_dates() {
        let body = parse(r#"{"name":"a","due":"2025-03-01"}"#).unwrap();
        assert_eq!(body.due.unwrap().to_rfc3339(), "2025-03-01T00:00:00+00:00");

        let body = parse(r#"{"name":"a","due":"2025-03-01T10:30:00-03:00"}"#).unwrap();
        assert_eq!(body.due.unwrap().to_rfc3339(), "2025-03-01T13:30:00+00:00");

        let body = parse(r#"{"name":"a","due":"2025-03-01T10:30:00.000Z"}"#).unwrap();
        assert_eq!(body.due.unwrap().to_rfc3339(), "2025-03-01T10:30:00+00:00");

        assert!(parse(r#"{"name":"a","due":null}"#).unwrap().due.is_none());
        assert!(parse(r#"{"name":"a","due":"next tuesday"}"#).is_err());
    }

    #[test]
    fn test_parse_datetime_without_zone() {
        let dt = parse_datetime("2025-03-01T08:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T08:00:00+00:00");
    }
}
