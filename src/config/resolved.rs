//! Resolved entity model: config validated and flattened for runtime use.

use std::collections::HashMap;
use std::sync::Arc;

/// When a field must carry a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Always,
    /// Required for new records only (e.g. a password on an edit form may stay blank).
    OnCreate,
}

impl Requirement {
    pub fn applies(&self, creating: bool) -> bool {
        match self {
            Requirement::Optional => false,
            Requirement::Always => true,
            Requirement::OnCreate => creating,
        }
    }
}

/// Rules shared by every field variant.
#[derive(Clone, Debug)]
pub struct FieldRules {
    pub required: Requirement,
    pub max_length: Option<u32>,
    pub min_length: Option<u32>,
}

/// Where a select field gets its `{value, label}` pairs from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionsSource {
    pub url: String,
    pub value_key: String,
    pub label_key: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Email,
    Password,
}

/// One editable field. The variant decides the value shape and the editor.
#[derive(Clone, Debug)]
pub enum FieldSpec {
    Text {
        name: String,
        label: String,
        kind: TextKind,
        rules: FieldRules,
        multiline: bool,
        auto_generate: bool,
    },
    Checkbox {
        name: String,
        label: String,
    },
    Select {
        name: String,
        label: String,
        rules: FieldRules,
        source: OptionsSource,
    },
    SelectMulti {
        name: String,
        label: String,
        rules: FieldRules,
        source: OptionsSource,
    },
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Text { name, .. }
            | FieldSpec::Checkbox { name, .. }
            | FieldSpec::Select { name, .. }
            | FieldSpec::SelectMulti { name, .. } => name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FieldSpec::Text { label, .. }
            | FieldSpec::Checkbox { label, .. }
            | FieldSpec::Select { label, .. }
            | FieldSpec::SelectMulti { label, .. } => label,
        }
    }

    pub fn rules(&self) -> Option<&FieldRules> {
        match self {
            FieldSpec::Text { rules, .. }
            | FieldSpec::Select { rules, .. }
            | FieldSpec::SelectMulti { rules, .. } => Some(rules),
            FieldSpec::Checkbox { .. } => None,
        }
    }

    pub fn options_source(&self) -> Option<&OptionsSource> {
        match self {
            FieldSpec::Select { source, .. } | FieldSpec::SelectMulti { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    pub fn auto_generates(&self) -> bool {
        matches!(self, FieldSpec::Text { auto_generate: true, .. })
    }
}

/// How a list cell renders its raw value.
#[derive(Clone, Debug, PartialEq)]
pub enum CellFormat {
    Plain,
    DateTime,
    Checkbox,
    Joined,
    /// Nested lookup, e.g. `["unitGroup", "code"]`.
    Path(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct ColumnSpec {
    pub field: String,
    pub header: String,
    pub flex: f32,
    pub sortable: bool,
    pub format: CellFormat,
}

/// How a copied record derives a field from its source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyTransform {
    Suffix(String),
    Prefix(String),
    Clear,
}

#[derive(Clone, Debug)]
pub struct CopyRule {
    pub field: String,
    pub transform: CopyTransform,
}

#[derive(Clone, Debug)]
pub struct Messages {
    pub success: String,
    pub failure: String,
    pub conflict: String,
}

#[derive(Clone, Debug)]
pub struct EntitySchema {
    pub id: String,
    pub title: String,
    pub base_path: String,
    pub entity_tag: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub columns: Vec<ColumnSpec>,
    pub copy_rules: Vec<CopyRule>,
    pub messages: Messages,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct EntityCatalog {
    pub entities: Vec<Arc<EntitySchema>>,
    pub entity_by_id: HashMap<String, Arc<EntitySchema>>,
}

impl EntityCatalog {
    pub fn entity(&self, id: &str) -> Option<Arc<EntitySchema>> {
        self.entity_by_id.get(id).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.id.as_str())
    }
}
