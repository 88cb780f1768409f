//! Convert serde_json::Value parameters to types sqlx can bind.

use serde_json::Value;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// A JSON value narrowed to a bindable PostgreSQL type.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    Json(Value),
}

impl BindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => BindValue::Null,
            Value::Bool(b) => BindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    BindValue::I64(i)
                } else {
                    BindValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => BindValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => BindValue::Json(v.clone()),
        }
    }
}

/// Bind every parameter in order. Strings bind as text; declare `sqlType` on a column to cast.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match BindValue::from_json(p) {
            BindValue::Null => query.bind(None::<String>),
            BindValue::Bool(b) => query.bind(b),
            BindValue::I64(n) => query.bind(n),
            BindValue::F64(n) => query.bind(n),
            BindValue::Text(s) => query.bind(s),
            BindValue::Json(v) => query.bind(sqlx::types::Json(v)),
        };
    }
    query
}
