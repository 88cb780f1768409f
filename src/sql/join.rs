//! LEFT JOINs for reference fields, one per field, aliased per referencing field.

use super::Dialect;
use crate::config::Schema;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    pub target_table: String,
    pub alias: String,
    /// Column on the target the reference stores.
    pub value_column: String,
    /// Referencing column on the base table.
    pub field_code: String,
}

/// One join per reference field that declares both a target and ref options, in declaration order.
pub fn joins(schema: &Schema) -> Vec<Join> {
    schema
        .fields
        .iter()
        .filter_map(|field| {
            let target = field.reference()?;
            let options = target.options.as_ref()?;
            Some(Join {
                target_table: target.target_table(),
                alias: target.alias(&field.code),
                value_column: options.value.clone(),
                field_code: field.code.clone(),
            })
        })
        .collect()
}

pub fn render_join(dialect: Dialect, base_table: &str, join: &Join) -> String {
    format!(
        "LEFT JOIN {} AS {} ON {} = {}",
        dialect.quote(&join.target_table),
        dialect.quote(&join.alias),
        dialect.qualified(&join.alias, &join.value_column),
        dialect.qualified(base_table, &join.field_code)
    )
}

/// Rendered joins, each preceded by a space; empty when there are none.
pub fn render_joins(dialect: Dialect, base_table: &str, joins: &[Join]) -> String {
    joins
        .iter()
        .map(|j| format!(" {}", render_join(dialect, base_table, j)))
        .collect()
}
