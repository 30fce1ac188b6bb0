//! Load entity configs from JSON (string, file, directory or the built-in catalog) and resolve them.

use crate::config::resolved::{
    CellFormat, ColumnSpec, CopyRule, CopyTransform, EntityCatalog, EntitySchema, FieldRules,
    FieldSpec, Messages, OptionsSource, Requirement, TextKind,
};
use crate::config::types::*;
use crate::config::{validate, validate_entity};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const BUILTIN_CATALOG: &str = include_str!("catalog.json");

const DEFAULT_SUCCESS: &str = "Record saved.";
const DEFAULT_FAILURE: &str = "Saving the record failed.";
const DEFAULT_CONFLICT: &str = "Code or name is already in use.";

/// Build the resolved catalog from full config (validates first).
pub fn resolve(config: &CatalogConfig) -> Result<EntityCatalog, ConfigError> {
    validate(config)?;
    let mut entities = Vec::with_capacity(config.entities.len());
    let mut entity_by_id = HashMap::new();
    for e in &config.entities {
        let schema = Arc::new(resolve_entity(e)?);
        entity_by_id.insert(schema.id.clone(), Arc::clone(&schema));
        entities.push(schema);
    }
    Ok(EntityCatalog {
        entities,
        entity_by_id,
    })
}

/// Resolve a single entity config into its runtime schema.
pub fn resolve_entity(config: &EntityConfig) -> Result<EntitySchema, ConfigError> {
    validate_entity(config)?;
    let fields = config.fields.iter().map(resolve_field).collect();
    let columns = config
        .columns
        .iter()
        .map(resolve_column)
        .collect::<Result<Vec<_>, _>>()?;
    let copy_rules = config
        .copy_rules
        .iter()
        .map(|r| {
            let transform = match (&r.suffix, &r.prefix) {
                (Some(s), _) => CopyTransform::Suffix(s.clone()),
                (None, Some(p)) => CopyTransform::Prefix(p.clone()),
                (None, None) => CopyTransform::Clear,
            };
            CopyRule {
                field: r.field.clone(),
                transform,
            }
        })
        .collect();

    Ok(EntitySchema {
        id: config.id.clone(),
        title: config.title.clone(),
        base_path: config.base_path.clone(),
        entity_tag: config.entity_tag.clone(),
        fields,
        columns,
        copy_rules,
        messages: Messages {
            success: config
                .success_message
                .clone()
                .unwrap_or_else(|| DEFAULT_SUCCESS.into()),
            failure: config
                .error_message
                .clone()
                .unwrap_or_else(|| DEFAULT_FAILURE.into()),
            conflict: config
                .conflict_message
                .clone()
                .unwrap_or_else(|| DEFAULT_CONFLICT.into()),
        },
    })
}

fn resolve_field(f: &FieldConfig) -> FieldSpec {
    let rules = FieldRules {
        required: match f.required {
            RequiredConfig::No => Requirement::Optional,
            RequiredConfig::Always => Requirement::Always,
            RequiredConfig::OnCreate => Requirement::OnCreate,
        },
        max_length: f.max_length,
        min_length: f.min_length,
    };
    let source = || OptionsSource {
        url: f.options_url.clone().unwrap_or_default(),
        value_key: f.option_value.clone(),
        label_key: f.option_label.clone(),
    };
    let text = |kind| FieldSpec::Text {
        name: f.name.clone(),
        label: f.label.clone(),
        kind,
        rules: rules.clone(),
        multiline: f.multiline,
        auto_generate: f.auto_generate,
    };
    match f.type_ {
        FieldKind::Text => text(TextKind::Plain),
        FieldKind::Email => text(TextKind::Email),
        FieldKind::Password => text(TextKind::Password),
        FieldKind::Checkbox => FieldSpec::Checkbox {
            name: f.name.clone(),
            label: f.label.clone(),
        },
        FieldKind::Select => FieldSpec::Select {
            name: f.name.clone(),
            label: f.label.clone(),
            rules: rules.clone(),
            source: source(),
        },
        FieldKind::SelectMulti => FieldSpec::SelectMulti {
            name: f.name.clone(),
            label: f.label.clone(),
            rules: rules.clone(),
            source: source(),
        },
    }
}

fn resolve_column(c: &ColumnConfig) -> Result<ColumnSpec, ConfigError> {
    let format = match c.format.as_deref().unwrap_or("plain") {
        "plain" => CellFormat::Plain,
        "date-time" => CellFormat::DateTime,
        "checkbox" => CellFormat::Checkbox,
        "joined" => CellFormat::Joined,
        "path" => CellFormat::Path(
            c.path
                .as_deref()
                .unwrap_or_default()
                .split('.')
                .map(str::to_string)
                .collect(),
        ),
        other => {
            return Err(ConfigError::Validation(format!(
                "unknown column format '{}'",
                other
            )))
        }
    };
    Ok(ColumnSpec {
        field: c.field.clone(),
        header: c.header.clone(),
        flex: c.flex,
        sortable: c.sortable,
        format,
    })
}

/// Parse a catalog from JSON: either `{ "entities": [...] }` or a bare array of entities.
pub fn load_from_str(json: &str) -> Result<CatalogConfig, ConfigError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    let parsed = if value.is_array() {
        serde_json::from_value(value).map(|entities| CatalogConfig { entities })
    } else {
        serde_json::from_value(value)
    };
    parsed.map_err(|e| ConfigError::Load(e.to_string()))
}

/// Load from a JSON file, or from every `*.json` file in a directory (sorted by name).
pub async fn load_from_path(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    if meta.is_file() {
        let raw = read(path).await?;
        return load_from_str(&raw);
    }

    let mut dir = tokio::fs::read_dir(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let mut files = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| ConfigError::Load(e.to_string()))?
    {
        let p = entry.path();
        if p.extension().map(|ext| ext == "json").unwrap_or(false) {
            files.push(p);
        }
    }
    files.sort();

    let mut config = CatalogConfig::default();
    for file in files {
        let raw = read(&file).await?;
        let part = load_from_str(&raw)?;
        tracing::debug!(file = %file.display(), entities = part.entities.len(), "loaded entity config");
        config.entities.extend(part.entities);
    }
    Ok(config)
}

async fn read(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// Catalog of the stock admin entities: branches, users, roles, stock categories, stock groups, units.
pub fn builtin_catalog() -> Result<EntityCatalog, ConfigError> {
    resolve(&load_from_str(BUILTIN_CATALOG)?)
}
