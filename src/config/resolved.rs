//! Resolved model: definitions validated and flattened for runtime use.

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub primary: bool,
    /// SQL type name used to cast bound parameters (e.g. "uuid").
    pub sql_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            primary: false,
            sql_type: None,
        }
    }

    pub fn primary(name: impl Into<String>) -> Self {
        Column {
            primary: true,
            ..Column::new(name)
        }
    }
}

#[derive(Clone, Debug)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Primary-key column names in declaration order. Empty when the table declares none.
    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefOptions {
    /// Column on the target table the reference stores.
    pub value: String,
    /// Column on the target table shown to users.
    pub display: String,
}

/// Target of a reference field, parsed from `"<moduleCode>-<modelCode>"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefTarget {
    pub module_code: String,
    pub model_code: String,
    pub options: Option<RefOptions>,
}

impl RefTarget {
    /// Splits on the first `-`. Returns None when either side is empty.
    pub fn parse(raw: &str, options: Option<RefOptions>) -> Option<Self> {
        let (module, model) = raw.split_once('-')?;
        if module.is_empty() || model.is_empty() {
            return None;
        }
        Some(RefTarget {
            module_code: module.to_string(),
            model_code: model.to_string(),
            options,
        })
    }

    /// Physical table holding the referenced model.
    pub fn target_table(&self) -> String {
        format!("{}_{}", self.module_code, self.model_code)
    }

    /// Join alias, unique per referencing field even when two fields share a target.
    pub fn alias(&self, field_code: &str) -> String {
        format!("{}_{}_{}", self.module_code, self.model_code, field_code)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Physical column on the base table.
    Plain,
    /// `ctrltype = "ref"`: projected as value + display columns through a join.
    SingleRef(RefTarget),
    /// `ctrltype = "refs"`: joined but not yet projected.
    MultiRef(RefTarget),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub code: String,
    pub ctrltype: Option<String>,
    pub kind: FieldKind,
}

impl Field {
    pub fn plain(code: impl Into<String>, ctrltype: Option<&str>) -> Self {
        Field {
            code: code.into(),
            ctrltype: ctrltype.map(str::to_string),
            kind: FieldKind::Plain,
        }
    }

    pub fn reference(&self) -> Option<&RefTarget> {
        match &self.kind {
            FieldKind::Plain => None,
            FieldKind::SingleRef(target) | FieldKind::MultiRef(target) => Some(target),
        }
    }

    /// Keyword search covers fields with no control type or the "string" control type.
    pub fn is_keyword_searchable(&self) -> bool {
        matches!(self.ctrltype.as_deref(), None | Some("string"))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Schema {
    /// In declaration order.
    pub fields: Vec<Field>,
}

/// Everything the dispatcher needs for one model: physical table plus logical schema.
#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub module_code: String,
    pub model_code: String,
    pub table: Table,
    pub schema: Schema,
}

impl ResolvedModel {
    pub fn key(&self) -> String {
        model_key(&self.module_code, &self.model_code)
    }
}

pub fn model_key(module_code: &str, model_code: &str) -> String {
    format!("{}-{}", module_code, model_code)
}

#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<ResolvedModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        ModelRegistry::default()
    }

    /// Returns false when a model with the same key is already registered.
    pub fn insert(&mut self, model: ResolvedModel) -> bool {
        let key = model.key();
        if self.models.contains_key(&key) {
            return false;
        }
        self.models.insert(key, Arc::new(model));
        true
    }

    pub fn get(&self, module_code: &str, model_code: &str) -> Option<Arc<ResolvedModel>> {
        self.models.get(&model_key(module_code, model_code)).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
