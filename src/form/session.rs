//! One open form: values, touched/error state, option cache and the submit lifecycle.
//!
//! Phases: `Closed -> LoadingInitialValues -> Editing -> Submitting -> (Closed | Editing)`.
//! The session is reset to empty on every close; nothing survives into the next open.

use crate::config::{EntitySchema, FieldSpec, OptionsSource};
use crate::error::{ConfigError, ErrorKind, FieldErrors, ScaffoldError};
use crate::form::hydration::FormEvent;
use crate::form::FieldValue;
use crate::notify::Notification;
use crate::record::{OptionKey, Record, RecordId};
use crate::sanitize::strip_markup;
use crate::service::{FieldValidator, SelectOption};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Closed,
    /// Open and editable while a generated value is still on its way.
    LoadingInitialValues,
    Editing,
    Submitting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

/// Async work a freshly opened session needs: option lists and an optional generated code.
#[derive(Clone, Debug)]
pub struct HydrationPlan {
    pub session: Uuid,
    pub option_fields: Vec<(String, OptionsSource)>,
    pub code_field: Option<String>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed locally; nothing was sent.
    Invalid(FieldErrors),
    /// Persisted; the session is closed.
    Saved {
        record: Record,
        mode: FormMode,
        notification: Notification,
    },
    /// Persistence failed; the session stays open with the user's values intact.
    Failed {
        kind: ErrorKind,
        notification: Notification,
    },
    /// Submit while closed or already submitting.
    Ignored,
}

pub struct FormSession {
    schema: Arc<EntitySchema>,
    id: Uuid,
    phase: FormPhase,
    mode: FormMode,
    values: BTreeMap<String, FieldValue>,
    touched: BTreeSet<String>,
    dirty: BTreeSet<String>,
    errors: FieldErrors,
    options: HashMap<String, Vec<SelectOption>>,
    code_field: Option<String>,
    failure: Option<String>,
}

impl FormSession {
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        FormSession {
            schema,
            id: Uuid::nil(),
            phase: FormPhase::Closed,
            mode: FormMode::Create,
            values: BTreeMap::new(),
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            errors: FieldErrors::new(),
            options: HashMap::new(),
            code_field: None,
            failure: None,
        }
    }

    /// Open for a new record (`None` or a record without id) or for editing (record with id).
    /// Every schema field gets a value: from the record when present, typed-empty otherwise.
    pub fn open(&mut self, initial: Option<&Record>) -> HydrationPlan {
        self.reset();
        self.id = Uuid::new_v4();
        self.mode = match initial.and_then(Record::id) {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };
        for spec in &self.schema.fields {
            let value = FieldValue::from_json(spec, initial.and_then(|r| r.get(spec.name())));
            self.values.insert(spec.name().to_string(), value);
        }

        let option_fields = self
            .schema
            .fields
            .iter()
            .filter_map(|f| f.options_source().map(|s| (f.name().to_string(), s.clone())))
            .collect();
        self.code_field = match self.mode {
            FormMode::Create => self
                .schema
                .fields
                .iter()
                .find(|f| f.auto_generates() && self.values.get(f.name()).map(FieldValue::is_empty).unwrap_or(true))
                .map(|f| f.name().to_string()),
            FormMode::Edit(_) => None,
        };
        self.phase = if self.code_field.is_some() {
            FormPhase::LoadingInitialValues
        } else {
            FormPhase::Editing
        };
        tracing::debug!(entity = %self.schema.id, session = %self.id, mode = ?self.mode, "form opened");

        HydrationPlan {
            session: self.id,
            option_fields,
            code_field: self.code_field.clone(),
        }
    }

    /// Cancel or explicit close: always back to an empty, closed session.
    pub fn close(&mut self) {
        if self.phase != FormPhase::Closed {
            tracing::debug!(entity = %self.schema.id, session = %self.id, "form closed");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.id = Uuid::nil();
        self.phase = FormPhase::Closed;
        self.mode = FormMode::Create;
        self.values.clear();
        self.touched.clear();
        self.dirty.clear();
        self.errors.clear();
        self.options.clear();
        self.code_field = None;
        self.failure = None;
    }

    /// Apply a hydration result. Events for another (older) session are dropped.
    pub fn apply(&mut self, event: FormEvent) -> bool {
        if self.phase == FormPhase::Closed || event.session() != self.id {
            tracing::debug!(session = %event.session(), "discarding event for stale form session");
            return false;
        }
        match event {
            FormEvent::Options { field, options, .. } => {
                self.options.insert(field, options);
            }
            FormEvent::Code { field, code, .. } => {
                if let Some(code) = code {
                    let untouched = !self.dirty.contains(&field)
                        && self.values.get(&field).map(FieldValue::is_empty).unwrap_or(true);
                    if untouched {
                        self.values.insert(field.clone(), FieldValue::Text(code));
                        self.errors.remove(&field);
                    }
                }
                if self.code_field.as_deref() == Some(field.as_str()) {
                    self.code_field = None;
                }
                if self.phase == FormPhase::LoadingInitialValues && self.code_field.is_none() {
                    self.phase = FormPhase::Editing;
                }
            }
        }
        true
    }

    /// Keystroke/selection: store the value and clear that field's error only.
    pub fn set_value(&mut self, name: &str, value: FieldValue) -> Result<(), ScaffoldError> {
        if !self.is_editable() {
            return Err(ConfigError::Validation(format!("form is not editable ({:?})", self.phase)).into());
        }
        let spec = self
            .schema
            .field(name)
            .ok_or_else(|| ConfigError::MissingReference {
                kind: "field",
                id: name.to_string(),
            })?;
        if !value.matches(spec) {
            return Err(ConfigError::Validation(format!("value does not fit field '{}'", name)).into());
        }
        self.values.insert(name.to_string(), value);
        self.dirty.insert(name.to_string());
        self.errors.remove(name);
        Ok(())
    }

    pub fn set_text(&mut self, name: &str, text: &str) -> Result<(), ScaffoldError> {
        self.set_value(name, FieldValue::Text(text.to_string()))
    }

    pub fn set_flag(&mut self, name: &str, on: bool) -> Result<(), ScaffoldError> {
        self.set_value(name, FieldValue::Flag(on))
    }

    pub fn select(&mut self, name: &str, key: Option<OptionKey>) -> Result<(), ScaffoldError> {
        self.set_value(name, FieldValue::Choice(key))
    }

    /// Add or remove one key of a multi-select.
    pub fn toggle_choice(&mut self, name: &str, key: OptionKey) -> Result<(), ScaffoldError> {
        let mut keys = match self.values.get(name) {
            Some(FieldValue::Choices(keys)) => keys.clone(),
            _ => BTreeSet::new(),
        };
        if !keys.remove(&key) {
            keys.insert(key);
        }
        self.set_value(name, FieldValue::Choices(keys))
    }

    /// Blur: mark touched and validate just this field.
    pub fn blur(&mut self, name: &str) {
        let Some(spec) = self.schema.field(name) else {
            return;
        };
        self.touched.insert(name.to_string());
        let empty = FieldValue::empty_for(spec);
        let value = self.values.get(name).unwrap_or(&empty);
        match FieldValidator::validate_field(spec, value, self.is_creating()) {
            Ok(()) => {
                self.errors.remove(name);
            }
            Err(msg) => {
                self.errors.insert(name.to_string(), msg);
            }
        }
    }

    /// Full-schema validation; invalid fields become touched so their messages show.
    pub fn validate(&mut self) -> bool {
        let errors = FieldValidator::validate_all(&self.schema.fields, &self.values, self.is_creating());
        for name in errors.keys() {
            self.touched.insert(name.clone());
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and, when valid, produce the sanitized record and enter `Submitting`.
    pub fn begin_submit(&mut self) -> Result<Record, FieldErrors> {
        if !self.validate() {
            return Err(self.errors.clone());
        }
        let mut record = Record::new();
        for spec in &self.schema.fields {
            let value = match self.values.get(spec.name()) {
                Some(FieldValue::Text(s)) => match strip_markup(s) {
                    Ok(clean) => FieldValue::Text(clean),
                    Err(e) => {
                        tracing::error!(entity = %self.schema.id, field = spec.name(), error = %e, "markup stripping failed");
                        self.errors
                            .insert(spec.name().to_string(), format!("{} could not be sanitized", spec.label()));
                        return Err(self.errors.clone());
                    }
                },
                Some(v) => v.clone(),
                None => FieldValue::empty_for(spec),
            };
            record.set(spec.name(), value.to_json());
        }
        self.failure = None;
        self.phase = FormPhase::Submitting;
        Ok(record)
    }

    /// Settle a submit started with [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, result: Result<Record, ScaffoldError>) -> SubmitOutcome {
        match result {
            Ok(record) => {
                let mode = self.mode.clone();
                let notification = Notification::success(self.schema.messages.success.clone());
                tracing::info!(entity = %self.schema.id, mode = ?mode, "form saved");
                self.close();
                SubmitOutcome::Saved {
                    record,
                    mode,
                    notification,
                }
            }
            Err(err) => {
                self.phase = FormPhase::Editing;
                let kind = err.kind();
                let message = match &err {
                    ScaffoldError::Validation(errors) => {
                        for (name, msg) in errors {
                            self.touched.insert(name.clone());
                            self.errors.insert(name.clone(), msg.clone());
                        }
                        self.schema.messages.failure.clone()
                    }
                    ScaffoldError::Conflict { .. } => err
                        .conflict_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| self.schema.messages.conflict.clone()),
                    _ => self.schema.messages.failure.clone(),
                };
                tracing::warn!(entity = %self.schema.id, error = %err, "form save failed");
                self.failure = Some(message.clone());
                SubmitOutcome::Failed {
                    kind,
                    notification: Notification::error(message),
                }
            }
        }
    }

    /// Validate, then hand the sanitized record to `persist`. No call is made when validation fails.
    pub async fn submit<F, Fut>(&mut self, persist: F) -> SubmitOutcome
    where
        F: FnOnce(Record) -> Fut,
        Fut: Future<Output = Result<Record, ScaffoldError>>,
    {
        if !self.is_editable() {
            return SubmitOutcome::Ignored;
        }
        let record = match self.begin_submit() {
            Ok(record) => record,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };
        let result = persist(record).await;
        self.finish_submit(result)
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.phase != FormPhase::Closed
    }

    pub fn is_creating(&self) -> bool {
        self.mode == FormMode::Create
    }

    fn is_editable(&self) -> bool {
        matches!(self.phase, FormPhase::Editing | FormPhase::LoadingInitialValues)
    }

    /// Save button disabled state.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, FormPhase::Submitting | FormPhase::LoadingInitialValues)
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Edit(_) => format!("Edit {}", self.schema.title),
            FormMode::Create => format!("New {}", self.schema.title),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.schema.fields
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    /// Inline error, shown only once the field is touched.
    pub fn error(&self, name: &str) -> Option<&str> {
        if !self.touched.contains(name) {
            return None;
        }
        self.errors.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Resolved options for a select field; empty until (or unless) loaded.
    pub fn options(&self, name: &str) -> &[SelectOption] {
        self.options.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn options_loaded(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Message from the last failed save, shown while the form stays open.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}
