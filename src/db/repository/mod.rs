//! Repository layer — entity-scoped database operations.
//!
//! Reads feed the SQLite gateway; inserts exist for seeding and imports.
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text, dates as `YYYY-MM-DD`.

mod appointment;
mod health_sample;
mod lab_panel;
mod patient;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{ToSql, ToSqlOutput, Type, Value};

use crate::models::Reading;

pub use appointment::*;
pub use health_sample::*;
pub use lab_panel::*;
pub use patient::*;

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_datetime(idx: usize, raw: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> Result<NaiveDate, rusqlite::Error> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Measurement columns may hold numbers or free text from entry forms.
/// Null and blank text read as absent; other text is kept as a coded reading.
pub(crate) fn loose_reading(value: Value) -> Option<Reading> {
    match value {
        Value::Integer(i) => Some(Reading::Number(i as f64)),
        Value::Real(f) => Some(Reading::Number(f)),
        Value::Text(s) => Reading::parse(&s),
        Value::Null | Value::Blob(_) => None,
    }
}

pub(crate) fn loose_number(value: Value) -> Option<f64> {
    loose_reading(value).and_then(|r| r.as_f64())
}

impl ToSql for Reading {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Reading::Number(n) => ToSqlOutput::from(*n),
            Reading::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// `?1, ?2, ...` placeholder list for an `IN (...)` clause starting at `first`.
pub(crate) fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered_from_offset() {
        assert_eq!(placeholders(1, 3), "?1, ?2, ?3");
        assert_eq!(placeholders(3, 2), "?3, ?4");
        assert_eq!(placeholders(1, 0), "");
    }

    #[test]
    fn loose_number_reads_every_storage_class() {
        assert_eq!(loose_number(Value::Integer(7)), Some(7.0));
        assert_eq!(loose_number(Value::Real(6.4)), Some(6.4));
        assert_eq!(loose_number(Value::Text("5.9".into())), Some(5.9));
        assert_eq!(loose_number(Value::Text(String::new())), None);
        assert_eq!(loose_number(Value::Null), None);
        assert_eq!(loose_number(Value::Text("<3.0".into())), None);
    }

    #[test]
    fn loose_reading_keeps_coded_text() {
        assert_eq!(
            loose_reading(Value::Text(" <3.0 ".into())),
            Some(Reading::Text("<3.0".into()))
        );
        assert_eq!(loose_reading(Value::Text("HI".into())), Some(Reading::Text("HI".into())));
        assert_eq!(loose_reading(Value::Text("  ".into())), None);
        assert_eq!(loose_reading(Value::Integer(80)), Some(Reading::Number(80.0)));
    }

    #[test]
    fn datetime_accepts_t_separator() {
        let parsed = parse_datetime(0, "2026-06-01T12:00:00").unwrap();
        assert_eq!(format_datetime(&parsed), "2026-06-01 12:00:00");
    }

    #[test]
    fn bad_date_is_a_conversion_error() {
        assert!(parse_date(2, "not-a-date").is_err());
    }
}
