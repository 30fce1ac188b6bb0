//! Cell text for list columns.

use crate::config::{CellFormat, ColumnSpec};
use crate::record::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const MISSING: &str = "-";
pub const INVALID_DATE: &str = "Invalid Date";

/// Raw value for a column; falls back to the PascalCase key some endpoints still send.
pub fn cell_value<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    match record.get(field) {
        Some(Value::Null) | None => {
            let mut chars = field.chars();
            let first = chars.next()?;
            let pascal: String = first.to_uppercase().chain(chars).collect();
            record.get(&pascal).filter(|v| !v.is_null())
        }
        found => found,
    }
}

pub fn format_cell(column: &ColumnSpec, record: &Record) -> String {
    match &column.format {
        CellFormat::Path(path) => format_path(record, path),
        format => {
            let value = cell_value(record, &column.field);
            match format {
                CellFormat::DateTime => format_date_time(value),
                CellFormat::Checkbox => format_checkbox(value),
                CellFormat::Joined => format_joined(value),
                _ => format_plain(value),
            }
        }
    }
}

pub fn format_plain(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `YYYY-MM-DD HH:MM` in the timestamp's own offset.
pub fn format_date_time(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => return MISSING.to_string(),
        Some(Value::String(s)) if s.is_empty() => return MISSING.to_string(),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return INVALID_DATE.to_string(),
    };
    match parse_timestamp(raw) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format_checkbox(value: Option<&Value>) -> String {
    let on = matches!(value, Some(Value::Bool(true)));
    if on { "[x]" } else { "[ ]" }.to_string()
}

/// Array items joined with `, `; objects show their `name`.
pub fn format_joined(value: Option<&Value>) -> String {
    let Some(Value::Array(items)) = value else {
        return MISSING.to_string();
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            Value::Object(obj) => obj.get("name").map(|n| format_plain(Some(n))).unwrap_or_default(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_path(record: &Record, path: &[String]) -> String {
    let Some((head, rest)) = path.split_first() else {
        return MISSING.to_string();
    };
    let mut current = cell_value(record, head);
    for key in rest {
        current = current.and_then(|v| v.get(key));
    }
    match current {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) if s.is_empty() => MISSING.to_string(),
        value => format_plain(value),
    }
}
