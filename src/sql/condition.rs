//! WHERE predicates: keyword search across string fields and key/value equality.

use super::QueryBuf;
use crate::config::{Schema, Table};
use crate::error::AppError;
use crate::response::Row;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    Like,
    Eq,
}

/// How a list of conditions is combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
}

impl Joiner {
    fn sep(self) -> &'static str {
        match self {
            Joiner::And => " AND ",
            Joiner::Or => " OR ",
        }
    }
}

/// One `table.column <op> <param>` predicate; the value is always bound, never inlined.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub table: String,
    pub column: String,
    pub predicate: Predicate,
    pub value: Value,
    pub cast: Option<String>,
}

impl Condition {
    /// Equality against a column of `table`, cast by the column's declared SQL type.
    pub fn eq(table: &Table, column: &str, value: Value) -> Self {
        Condition {
            table: table.name.clone(),
            column: column.to_string(),
            predicate: Predicate::Eq,
            value,
            cast: table.column(column).and_then(|c| c.sql_type.clone()),
        }
    }
}

/// One LIKE per keyword-searchable field. Empty when the keyword is empty or nothing is searchable.
pub fn keyword_conditions(table: &Table, schema: &Schema, keyword: &str) -> Vec<Condition> {
    if keyword.is_empty() {
        return Vec::new();
    }
    schema
        .fields
        .iter()
        .filter(|f| f.is_keyword_searchable())
        .map(|f| Condition {
            table: table.name.clone(),
            column: f.code.clone(),
            predicate: Predicate::Like,
            value: Value::String(format!("%{}%", keyword)),
            cast: None,
        })
        .collect()
}

/// One equality per key. Every key must be a column of `table`.
pub fn equality_conditions(table: &Table, record: &Row) -> Result<Vec<Condition>, AppError> {
    record
        .iter()
        .map(|(key, value)| {
            if !table.has_column(key) {
                return Err(AppError::BadRequest(format!(
                    "unknown column '{}' for {}",
                    key, table.name
                )));
            }
            Ok(Condition::eq(table, key, value.clone()))
        })
        .collect()
}

/// Render conditions joined by `joiner`, binding their values into `q`. Renders `1=1` when empty.
pub fn render_conditions(q: &mut QueryBuf, conditions: &[Condition], joiner: Joiner) -> String {
    if conditions.is_empty() {
        return "1=1".to_string();
    }
    let parts: Vec<String> = conditions
        .iter()
        .map(|c| {
            let col = q.dialect.qualified(&c.table, &c.column);
            let ph = q.push_param(c.value.clone(), c.cast.as_deref());
            match c.predicate {
                Predicate::Like => format!("{} LIKE {}", q.dialect.as_text(&col), ph),
                Predicate::Eq => format!("{} = {}", col, ph),
            }
        })
        .collect();
    if parts.len() > 1 && joiner == Joiner::Or {
        format!("({})", parts.join(joiner.sep()))
    } else {
        parts.join(joiner.sep())
    }
}
