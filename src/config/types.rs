//! Raw model definition types matching the JSON model files.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    /// SQL type used to cast bound parameters for this column (e.g. "uuid").
    /// Without it values bind as text, so non-text keys and filter columns need one.
    #[serde(default, rename = "sqlType")]
    pub sql_type: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefOptionsConfig {
    pub value: String,
    pub display: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub ctrltype: Option<String>,
    #[serde(default, rename = "ref")]
    pub ref_: Option<String>,
    #[serde(default, rename = "refOptions")]
    pub ref_options: Option<RefOptionsConfig>,
}

/// Logical fields keyed by field code. Kept as a JSON map so declaration order survives.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// One model file: `{ "module": "hr", "model": "dept", "table": {...}, "schema": {...} }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub module: String,
    pub model: String,
    pub table: TableConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}
