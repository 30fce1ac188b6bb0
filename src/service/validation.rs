//! Field validation from schema rules.

use crate::config::{FieldSpec, TextKind};
use crate::error::FieldErrors;
use crate::form::FieldValue;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn email_pattern() -> Result<&'static Regex, &'static regex::Error> {
    static EMAIL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")).as_ref()
}

pub struct FieldValidator;

impl FieldValidator {
    /// Validate every field; returns the message per invalid field (empty when all pass).
    pub fn validate_all(
        fields: &[FieldSpec],
        values: &BTreeMap<String, FieldValue>,
        creating: bool,
    ) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for spec in fields {
            if let Some(value) = values.get(spec.name()) {
                if let Err(msg) = Self::validate_field(spec, value, creating) {
                    errors.insert(spec.name().to_string(), msg);
                }
            }
        }
        errors
    }

    /// Validate one field. Optional fields left empty skip the remaining checks.
    pub fn validate_field(spec: &FieldSpec, value: &FieldValue, creating: bool) -> Result<(), String> {
        let Some(rules) = spec.rules() else {
            return Ok(());
        };
        let label = spec.label();
        if value.is_empty() {
            if rules.required.applies(creating) {
                return Err(match spec {
                    FieldSpec::SelectMulti { .. } => format!("Select at least one {}", label),
                    _ => format!("{} is required", label),
                });
            }
            return Ok(());
        }

        let Some(text) = value.as_text() else {
            return Ok(());
        };
        let len = text.chars().count();
        if let Some(max) = rules.max_length {
            if len > max as usize {
                return Err(format!("{} must be at most {} characters", label, max));
            }
        }
        if let Some(min) = rules.min_length {
            if len < min as usize {
                return Err(format!("{} must be at least {} characters", label, min));
            }
        }
        if let FieldSpec::Text {
            kind: TextKind::Email,
            ..
        } = spec
        {
            let email = email_pattern().map_err(|_| format!("invalid e-mail pattern for {}", label))?;
            if !email.is_match(text.trim()) {
                return Err(format!("{} must be a valid e-mail", label));
            }
        }
        Ok(())
    }
}
