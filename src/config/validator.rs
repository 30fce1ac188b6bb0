//! Config validation: uniqueness and per-field consistency.

use crate::config::{CatalogConfig, EntityConfig, FieldKind};
use crate::error::ConfigError;
use std::collections::HashSet;

const CELL_FORMATS: [&str; 5] = ["plain", "date-time", "checkbox", "joined", "path"];

pub fn validate(config: &CatalogConfig) -> Result<(), ConfigError> {
    let mut ids = HashSet::new();
    for entity in &config.entities {
        validate_entity(entity)?;
        if !ids.insert(entity.id.as_str()) {
            return Err(ConfigError::DuplicateEntity(entity.id.clone()));
        }
    }
    Ok(())
}

pub fn validate_entity(entity: &EntityConfig) -> Result<(), ConfigError> {
    if entity.id.trim().is_empty() {
        return Err(ConfigError::Validation("entity id must not be empty".into()));
    }
    if entity.base_path.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "entity '{}' requires a base_path",
            entity.id
        )));
    }

    let mut names = HashSet::new();
    for f in &entity.fields {
        if f.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "entity '{}' has a field without a name",
                entity.id
            )));
        }
        if !names.insert(f.name.as_str()) {
            return Err(ConfigError::DuplicateField {
                entity: entity.id.clone(),
                field: f.name.clone(),
            });
        }
        if matches!(f.type_, FieldKind::Select | FieldKind::SelectMulti)
            && f.options_url.as_deref().map(str::is_empty).unwrap_or(true)
        {
            return Err(ConfigError::MissingReference {
                kind: "options_url",
                id: format!("{}.{}", entity.id, f.name),
            });
        }
        if f.auto_generate {
            if f.type_ != FieldKind::Text {
                return Err(ConfigError::Validation(format!(
                    "{}.{}: auto_generate is only supported on text fields",
                    entity.id, f.name
                )));
            }
            if entity.entity_tag.is_none() {
                return Err(ConfigError::MissingEntityTag(entity.id.clone()));
            }
        }
        if let (Some(min), Some(max)) = (f.min_length, f.max_length) {
            if min > max {
                return Err(ConfigError::Validation(format!(
                    "{}.{}: min_length {} exceeds max_length {}",
                    entity.id, f.name, min, max
                )));
            }
        }
    }

    for c in &entity.columns {
        if c.field.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "entity '{}' has a column without a field",
                entity.id
            )));
        }
        let format = c.format.as_deref().unwrap_or("plain");
        if !CELL_FORMATS.contains(&format) {
            return Err(ConfigError::Validation(format!(
                "{}.{}: unknown column format '{}'",
                entity.id, c.field, format
            )));
        }
        if format == "path" && c.path.as_deref().map(str::is_empty).unwrap_or(true) {
            return Err(ConfigError::MissingReference {
                kind: "column path",
                id: format!("{}.{}", entity.id, c.field),
            });
        }
    }

    for rule in &entity.copy_rules {
        let transforms = [rule.suffix.is_some(), rule.prefix.is_some(), rule.clear]
            .iter()
            .filter(|set| **set)
            .count();
        if rule.field.trim().is_empty() || transforms != 1 {
            return Err(ConfigError::Validation(format!(
                "entity '{}': copy rule for '{}' needs exactly one of suffix, prefix, clear",
                entity.id, rule.field
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(json: &str) -> EntityConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let e = entity(
            r#"{ "id": "branches", "title": "Branch", "base_path": "/branches",
                 "fields": [ { "name": "code", "label": "Code" }, { "name": "code", "label": "Again" } ] }"#,
        );
        assert!(matches!(
            validate_entity(&e),
            Err(ConfigError::DuplicateField { .. })
        ));
    }

    #[test]
    fn select_requires_options_url() {
        let e = entity(
            r#"{ "id": "units", "title": "Unit", "base_path": "/Unit",
                 "fields": [ { "name": "unitGroupId", "label": "Group", "type": "select" } ] }"#,
        );
        assert!(matches!(
            validate_entity(&e),
            Err(ConfigError::MissingReference { kind: "options_url", .. })
        ));
    }

    #[test]
    fn auto_generate_requires_entity_tag() {
        let e = entity(
            r#"{ "id": "cats", "title": "Category", "base_path": "/StockCategory",
                 "fields": [ { "name": "code", "label": "Code", "auto_generate": true } ] }"#,
        );
        assert!(matches!(
            validate_entity(&e),
            Err(ConfigError::MissingEntityTag(_))
        ));
    }

    #[test]
    fn copy_rule_needs_one_transform() {
        let e = entity(
            r#"{ "id": "roles", "title": "Role", "base_path": "/roles",
                 "fields": [ { "name": "name", "label": "Name" } ],
                 "copy_rules": [ { "field": "name", "suffix": " (copy)", "clear": true } ] }"#,
        );
        assert!(validate_entity(&e).is_err());
    }

    #[test]
    fn rejects_duplicate_entity_ids() {
        let e = entity(
            r#"{ "id": "roles", "title": "Role", "base_path": "/roles",
                 "fields": [ { "name": "name", "label": "Name" } ] }"#,
        );
        let config = CatalogConfig {
            entities: vec![e.clone(), e],
        };
        assert!(matches!(validate(&config), Err(ConfigError::DuplicateEntity(_))));
    }
}
