//! Load model definitions from JSON files and resolve them into runtime models.

use crate::config::resolved::{Column, Field, FieldKind, ModelRegistry, RefOptions, RefTarget, ResolvedModel, Schema, Table};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::path::Path;

/// Build resolved model from a model definition (validates first).
pub fn resolve(config: &ModelConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;

    let table = Table {
        name: config.table.name.clone(),
        columns: config
            .table
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                primary: c.primary,
                sql_type: c.sql_type.clone(),
            })
            .collect(),
    };

    let mut fields = Vec::with_capacity(config.schema.fields.len());
    for (code, raw) in &config.schema.fields {
        let field_config: FieldConfig =
            serde_json::from_value(raw.clone()).map_err(|e| ConfigError::InvalidField {
                field: code.clone(),
                message: e.to_string(),
            })?;
        fields.push(resolve_field(code, field_config)?);
    }

    Ok(ResolvedModel {
        module_code: config.module.clone(),
        model_code: config.model.clone(),
        table,
        schema: Schema { fields },
    })
}

fn resolve_field(code: &str, config: FieldConfig) -> Result<Field, ConfigError> {
    let Some(raw_ref) = config.ref_ else {
        return Ok(Field {
            code: code.to_string(),
            ctrltype: config.ctrltype,
            kind: FieldKind::Plain,
        });
    };
    let options = config.ref_options.map(|o| RefOptions {
        value: o.value,
        display: o.display,
    });
    let target = RefTarget::parse(&raw_ref, options).ok_or_else(|| ConfigError::InvalidReference {
        field: code.to_string(),
        value: raw_ref.clone(),
    })?;
    let kind = match config.ctrltype.as_deref() {
        None | Some("ref") => FieldKind::SingleRef(target),
        Some("refs") => FieldKind::MultiRef(target),
        Some(other) => {
            return Err(ConfigError::UnsupportedRefControl {
                field: code.to_string(),
                ctrltype: other.to_string(),
            })
        }
    };
    Ok(Field {
        code: code.to_string(),
        ctrltype: config.ctrltype,
        kind,
    })
}

/// Resolve a set of model definitions into a registry. Duplicate module/model pairs are rejected.
pub fn build_registry(configs: &[ModelConfig]) -> Result<ModelRegistry, ConfigError> {
    let mut registry = ModelRegistry::new();
    for config in configs {
        let model = resolve(config)?;
        let key = model.key();
        if !registry.insert(model) {
            return Err(ConfigError::DuplicateModel(key));
        }
    }
    Ok(registry)
}

/// Load every `*.json` model file in `dir` (sorted by file name) and build a registry.
pub async fn load_registry_from_dir(dir: impl AsRef<Path>) -> Result<ModelRegistry, ConfigError> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", dir.display(), e)))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfigError::Load(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut configs = Vec::with_capacity(paths.len());
    for path in &paths {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let config: ModelConfig = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        configs.push(config);
    }

    let registry = build_registry(&configs)?;
    tracing::info!(dir = %dir.display(), models = registry.len(), "loaded model definitions");
    Ok(registry)
}
