//! Raw config types matching the entity catalog JSON.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Password,
    Checkbox,
    Select,
    SelectMulti,
}

/// `required` accepts `true`, `false` or `"on-create"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RequiredConfig {
    #[default]
    No,
    Always,
    OnCreate,
}

impl<'de> Deserialize<'de> for RequiredConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;
        match v {
            serde_json::Value::Bool(true) => Ok(RequiredConfig::Always),
            serde_json::Value::Bool(false) | serde_json::Value::Null => Ok(RequiredConfig::No),
            serde_json::Value::String(s) if s.eq_ignore_ascii_case("on-create") => {
                Ok(RequiredConfig::OnCreate)
            }
            other => Err(serde::de::Error::custom(format!(
                "required must be true, false or \"on-create\"; got {}",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub type_: FieldKind,
    #[serde(default)]
    pub required: RequiredConfig,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub multiline: bool,
    /// Fill the field from the code generator when a new record is opened.
    #[serde(default)]
    pub auto_generate: bool,
    #[serde(default)]
    pub options_url: Option<String>,
    #[serde(default = "default_option_value")]
    pub option_value: String,
    #[serde(default = "default_option_label")]
    pub option_label: String,
}

fn default_option_value() -> String {
    "id".into()
}

fn default_option_label() -> String {
    "name".into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub field: String,
    pub header: String,
    #[serde(default = "default_flex")]
    pub flex: f32,
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// One of `plain`, `date-time`, `checkbox`, `joined`, `path`.
    #[serde(default)]
    pub format: Option<String>,
    /// Dotted lookup for the `path` format, e.g. `unitGroup.code`.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_flex() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CopyRuleConfig {
    pub field: String,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub clear: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    pub id: String,
    pub title: String,
    pub base_path: String,
    /// Tag sent to the code generator; entities without one cannot generate codes.
    #[serde(default)]
    pub entity_tag: Option<String>,
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub copy_rules: Vec<CopyRuleConfig>,
    #[serde(default)]
    pub success_message: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub conflict_message: Option<String>,
}

/// All entity configs in one struct for in-memory loading.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub entities: Vec<EntityConfig>,
}
