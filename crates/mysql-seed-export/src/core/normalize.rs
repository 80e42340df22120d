//! Row normalization.
//!
//! Turns raw fetched rows into rows ready for literal rendering:
//!
//! - Boolean columns: coerced to `true`/`false`
//! - Timestamp columns: NULL, empty and zero-datetime values replaced by `now`
//! - Date columns: empty and zero-date values replaced by NULL
//! - Everything else: single quotes escaped as `\'`
//!
//! Keys that are not real columns (positional duplicates from a "both" fetch)
//! trigger [`ensure_audit_columns`].

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{ExportError, Result};

use super::value::{LiteralKey, NormalizedRow, RawRow, SqlValue};

/// Format of `now` and of MySQL DATETIME literals.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Zero-datetime sentinel stored instead of NULL.
pub const ZERO_DATETIME: &str = "0000-00-00 00:00:00";

/// Zero-date sentinels stored instead of NULL.
pub const ZERO_DATES: [&str; 3] = ["", "0000-00-00", "0000"];

/// Audit columns backfilled on rows with spurious keys.
pub const AUDIT_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// The export run's notion of "now", formatted `YYYY-MM-DD HH:MM:SS`.
///
/// Captured once per run and shared by every row so that all backfilled
/// timestamps of a run are identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    /// Format a naive date-time.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self(dt.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` string.
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map(Self::from_naive)
            .map_err(|e| ExportError::Config(format!("invalid timestamp '{}': {}", s, e)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn to_value(&self) -> SqlValue {
        SqlValue::Text(self.0.clone())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied column classification.
///
/// A column listed in several sets is treated by the first matching set in
/// the order boolean, timestamp, date.
#[derive(Debug, Clone, Default)]
pub struct ColumnClasses {
    pub boolean: HashSet<String>,
    pub timestamp: HashSet<String>,
    pub date: HashSet<String>,
}

impl ColumnClasses {
    pub fn new<B, T, D>(boolean: B, timestamp: T, date: D) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            boolean: boolean.into_iter().map(Into::into).collect(),
            timestamp: timestamp.into_iter().map(Into::into).collect(),
            date: date.into_iter().map(Into::into).collect(),
        }
    }

    /// Columns that appear in more than one set, sorted.
    pub fn overlapping(&self) -> Vec<String> {
        let mut overlap: Vec<String> = self
            .boolean
            .iter()
            .chain(self.timestamp.iter())
            .chain(self.date.iter())
            .filter(|name| {
                [&self.boolean, &self.timestamp, &self.date]
                    .iter()
                    .filter(|set| set.contains(*name))
                    .count()
                    > 1
            })
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        overlap.sort();
        overlap
    }

    fn classify(&self, column: &str) -> ColumnClass {
        if self.boolean.contains(column) {
            ColumnClass::Boolean
        } else if self.timestamp.contains(column) {
            ColumnClass::Timestamp
        } else if self.date.contains(column) {
            ColumnClass::Date
        } else {
            ColumnClass::Plain
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnClass {
    Boolean,
    Timestamp,
    Date,
    Plain,
}

/// Normalize every row of a table.
pub fn normalize_rows(
    rows: &[RawRow],
    valid_columns: &[String],
    classes: &ColumnClasses,
    now: &Timestamp,
) -> Result<Vec<NormalizedRow>> {
    let valid: HashSet<&str> = valid_columns.iter().map(String::as_str).collect();
    rows.iter()
        .map(|row| normalize_row_with(row, &valid, classes, now))
        .collect()
}

/// Normalize a single row.
pub fn normalize_row(
    row: &RawRow,
    valid_columns: &[String],
    classes: &ColumnClasses,
    now: &Timestamp,
) -> Result<NormalizedRow> {
    let valid: HashSet<&str> = valid_columns.iter().map(String::as_str).collect();
    normalize_row_with(row, &valid, classes, now)
}

fn normalize_row_with(
    row: &RawRow,
    valid: &HashSet<&str>,
    classes: &ColumnClasses,
    now: &Timestamp,
) -> Result<NormalizedRow> {
    let mut out = NormalizedRow::with_capacity(row.len());

    for (key, value) in row {
        let column = match key {
            LiteralKey::Str(name) if valid.contains(name.as_str()) => name,
            _ => {
                ensure_audit_columns(&mut out, now);
                continue;
            }
        };

        let normalized = match classes.classify(column) {
            ColumnClass::Boolean => SqlValue::Bool(coerce_bool(value)?),
            ColumnClass::Timestamp if is_missing_timestamp(value) => now.to_value(),
            ColumnClass::Date if is_zero_date(value) => SqlValue::Null,
            _ => escape_single_quotes(value),
        };

        // Re-inserting an existing key keeps its position.
        out.insert(column.clone(), normalized);
    }

    Ok(out)
}

/// Add `created_at`/`updated_at` set to `now` when they are absent.
///
/// Idempotent: existing values are never overwritten.
pub fn ensure_audit_columns(row: &mut NormalizedRow, now: &Timestamp) {
    for column in AUDIT_COLUMNS {
        row.entry(column.to_string()).or_insert_with(|| now.to_value());
    }
}

/// Boolean coercion for scalar values.
///
/// NULL, `false`, `0`, `0.0`, `""` and `"0"` are false; every other scalar
/// is true. Lists and maps have no truth value.
pub fn coerce_bool(value: &SqlValue) -> Result<bool> {
    match value {
        SqlValue::Null => Ok(false),
        SqlValue::Bool(b) => Ok(*b),
        SqlValue::Int(i) => Ok(*i != 0),
        SqlValue::Float(f) => Ok(*f != 0.0),
        SqlValue::Text(s) => Ok(!(s.is_empty() || s == "0")),
        SqlValue::Bytes(b) => Ok(!(b.is_empty() || b.as_slice() == b"0")),
        SqlValue::List(_) | SqlValue::Map(_) => Err(ExportError::unsupported(format!(
            "{} has no boolean value",
            value.kind()
        ))),
    }
}

fn is_missing_timestamp(value: &SqlValue) -> bool {
    match value {
        SqlValue::Null => true,
        SqlValue::Text(s) => s.is_empty() || s == ZERO_DATETIME,
        _ => false,
    }
}

// NULL is deliberately not matched: a NULL date stays NULL on its own.
fn is_zero_date(value: &SqlValue) -> bool {
    value.as_text().is_some_and(|s| ZERO_DATES.contains(&s))
}

/// Prefix every `'` in a text value with a backslash.
pub fn escape_single_quotes(value: &SqlValue) -> SqlValue {
    match value {
        SqlValue::Text(s) if s.contains('\'') => SqlValue::Text(s.replace('\'', "\\'")),
        other => other.clone(),
    }
}
