//! Typed field values, one shape per field variant.

use crate::config::FieldSpec;
use crate::record::{OptionKey, RecordId};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Choice(Option<OptionKey>),
    /// Chosen keys of a multi-select; order is irrelevant.
    Choices(BTreeSet<OptionKey>),
}

impl FieldValue {
    /// `''` for text, `false` for checkbox, nothing chosen for selects.
    pub fn empty_for(spec: &FieldSpec) -> FieldValue {
        match spec {
            FieldSpec::Text { .. } => FieldValue::Text(String::new()),
            FieldSpec::Checkbox { .. } => FieldValue::Flag(false),
            FieldSpec::Select { .. } => FieldValue::Choice(None),
            FieldSpec::SelectMulti { .. } => FieldValue::Choices(BTreeSet::new()),
        }
    }

    /// Read a record value into the field's shape; absent or mistyped values become empty.
    pub fn from_json(spec: &FieldSpec, value: Option<&Value>) -> FieldValue {
        let Some(value) = value else {
            return FieldValue::empty_for(spec);
        };
        match spec {
            FieldSpec::Text { .. } => FieldValue::Text(match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => String::new(),
            }),
            FieldSpec::Checkbox { .. } => FieldValue::Flag(match value {
                Value::Bool(b) => *b,
                Value::String(s) => s.eq_ignore_ascii_case("true"),
                _ => false,
            }),
            FieldSpec::Select { .. } => FieldValue::Choice(RecordId::from_value(value)),
            FieldSpec::SelectMulti { .. } => FieldValue::Choices(
                value
                    .as_array()
                    .map(|items| items.iter().filter_map(RecordId::from_value).collect())
                    .unwrap_or_default(),
            ),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Flag(b) => Value::Bool(*b),
            FieldValue::Choice(Some(k)) => k.to_value(),
            FieldValue::Choice(None) => Value::Null,
            FieldValue::Choices(keys) => Value::Array(keys.iter().map(RecordId::to_value).collect()),
        }
    }

    /// Checkbox values are never empty; `false` is a real answer.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Flag(_) => false,
            FieldValue::Choice(k) => k.is_none(),
            FieldValue::Choices(keys) => keys.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value fits the field variant.
    pub fn matches(&self, spec: &FieldSpec) -> bool {
        matches!(
            (self, spec),
            (FieldValue::Text(_), FieldSpec::Text { .. })
                | (FieldValue::Flag(_), FieldSpec::Checkbox { .. })
                | (FieldValue::Choice(_), FieldSpec::Select { .. })
                | (FieldValue::Choices(_), FieldSpec::SelectMulti { .. })
        )
    }
}
