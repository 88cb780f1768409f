//! Model validation: identifier safety and table/schema consistency.

use crate::config::{ModelConfig, SchemaConfig};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("static regex"))
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static regex"))
}

fn sql_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_ .,()]*$").expect("static regex"))
}

fn check_identifier(kind: &'static str, value: &str) -> Result<(), ConfigError> {
    if identifier_re().is_match(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

fn check_code(kind: &'static str, value: &str) -> Result<(), ConfigError> {
    if code_re().is_match(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

pub fn validate(config: &ModelConfig) -> Result<(), ConfigError> {
    check_code("module", &config.module)?;
    check_code("model", &config.model)?;
    check_identifier("table", &config.table.name)?;

    let mut seen = HashSet::new();
    for c in &config.table.columns {
        check_identifier("column", &c.name)?;
        if !seen.insert(c.name.as_str()) {
            return Err(ConfigError::DuplicateColumn {
                table: config.table.name.clone(),
                column: c.name.clone(),
            });
        }
        if let Some(ty) = &c.sql_type {
            if !sql_type_re().is_match(ty) {
                return Err(ConfigError::InvalidIdentifier {
                    kind: "sql type",
                    value: ty.clone(),
                });
            }
        }
    }

    validate_fields(&config.schema, &config.table.name, &seen)?;

    if !config.table.columns.iter().any(|c| c.primary) {
        tracing::warn!(
            table = %config.table.name,
            "table declares no primary key; list and single-record lookups will be refused"
        );
    }
    Ok(())
}

fn validate_fields(
    schema: &SchemaConfig,
    table_name: &str,
    columns: &HashSet<&str>,
) -> Result<(), ConfigError> {
    for code in schema.fields.keys() {
        check_identifier("field", code)?;
        if !columns.contains(code.as_str()) {
            return Err(ConfigError::UnknownFieldColumn {
                field: code.clone(),
                table: table_name.to_string(),
            });
        }
    }
    Ok(())
}
