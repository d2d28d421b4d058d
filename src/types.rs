//! Core data model types.
//!
//! A sheet is loaded into an in-memory [`Table`]: an ordered list of column names plus
//! row-major [`Value`] storage.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Serialize, Serializer};

/// Text format used for date/time cells in exported JSON.
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// A single cell value in a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Date and/or time without a timezone.
    DateTime(NaiveDateTime),
    /// Elapsed time (e.g. an `[h]:mm` cell).
    Duration(TimeDelta),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// ISO-8601 rendering used by the JSON exporter (`None` for non date/time values).
    pub fn to_iso_string(&self) -> Option<String> {
        match self {
            Value::DateTime(dt) => Some(dt.format(ISO_DATETIME_FORMAT).to_string()),
            Value::Duration(d) => Some(iso_duration(*d)),
            _ => None,
        }
    }
}

/// Render a duration as ISO-8601 text, e.g. `P1DT12H0M0S` or `-P0DT0H0M1.500S`.
pub fn iso_duration(d: TimeDelta) -> String {
    let sign = if d < TimeDelta::zero() { "-" } else { "" };
    let d = d.abs();
    let total_ms = d.num_milliseconds();
    let (days, rem_ms) = (total_ms / 86_400_000, total_ms % 86_400_000);
    let (hours, rem_ms) = (rem_ms / 3_600_000, rem_ms % 3_600_000);
    let (minutes, rem_ms) = (rem_ms / 60_000, rem_ms % 60_000);
    let (seconds, millis) = (rem_ms / 1_000, rem_ms % 1_000);
    if millis == 0 {
        format!("{sign}P{days}DT{hours}H{minutes}M{seconds}S")
    } else {
        format!("{sign}P{days}DT{hours}H{minutes}M{seconds}.{millis:03}S")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => f.write_str(v),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Duration(d) => f.write_str(&iso_duration(*d)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int64(v) => serializer.serialize_i64(*v),
            // JSON has no NaN/inf.
            Value::Float64(v) if !v.is_finite() => serializer.serialize_unit(),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Utf8(v) => serializer.serialize_str(v),
            Value::DateTime(dt) => serializer.collect_str(&dt.format(ISO_DATETIME_FORMAT)),
            Value::Duration(d) => serializer.serialize_str(&iso_duration(*d)),
        }
    }
}

/// In-memory table for a single sheet.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as [`Table::columns`]; every row has
/// exactly one value per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns `true` if a column named `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// The first `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Iterate the values of column `idx`, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::{iso_duration, Table, Value};
    use chrono::{NaiveDate, TimeDelta};

    fn sample_table() -> Table {
        Table::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![Value::Int64(1), Value::Utf8("a".to_string())],
                vec![Value::Int64(2), Value::Null],
                vec![Value::Int64(3), Value::Utf8("c".to_string())],
            ],
        )
    }

    #[test]
    fn shape_and_lookup() {
        let t = sample_table();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.index_of("name"), Some(1));
        assert!(!t.has_column("missing"));
    }

    #[test]
    fn head_is_clamped_to_row_count() {
        let t = sample_table();
        assert_eq!(t.head(5).len(), 3);
        assert_eq!(t.head(2).len(), 2);
        assert!(t.head(0).is_empty());
    }

    #[test]
    fn column_values_follow_row_order() {
        let t = sample_table();
        let ids: Vec<&Value> = t.column_values(0).collect();
        assert_eq!(ids, vec![&Value::Int64(1), &Value::Int64(2), &Value::Int64(3)]);
    }

    #[test]
    fn values_serialize_to_json_scalars() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let values = vec![
            Value::Null,
            Value::Int64(7),
            Value::Float64(2.5),
            Value::Float64(f64::NAN),
            Value::Bool(true),
            Value::Utf8("x".to_string()),
            Value::DateTime(dt),
            Value::Duration(TimeDelta::try_hours(36).unwrap()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"[null,7,2.5,null,true,"x","2024-01-15T09:30:00.000","P1DT12H0M0S"]"#
        );
    }

    #[test]
    fn durations_render_as_iso_text() {
        assert_eq!(iso_duration(TimeDelta::zero()), "P0DT0H0M0S");
        assert_eq!(iso_duration(TimeDelta::try_minutes(90).unwrap()), "P0DT1H30M0S");
        assert_eq!(iso_duration(TimeDelta::try_milliseconds(-1_500).unwrap()), "-P0DT0H0M1.500S");
    }

    #[test]
    fn display_uses_plain_text() {
        let dt = NaiveDate::from_ymd_opt(2023, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2023-12-01 00:00:00");
        assert_eq!(Value::Utf8("HR".to_string()).to_string(), "HR");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
