//! Database collaborator: the three primitives the dispatcher needs, and a PostgreSQL implementation.

use crate::config::Table;
use crate::response::Row;
use crate::sql::{bind_params, insert_bulk, Dialect, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

/// PostgreSQL accepts at most this many bind parameters per statement.
const MAX_BIND_PARAMS: usize = 65_535;

/// Execution primitives. Each call resolves to exactly one of rows/result or error.
#[async_trait]
pub trait Database: Send + Sync {
    /// Flavor statements must be rendered in.
    fn dialect(&self) -> Dialect;

    /// Read-only statement; returns every row.
    async fn query(&self, q: &QueryBuf) -> Result<Vec<Row>, sqlx::Error>;

    /// Single mutating statement wrapped in a transaction.
    async fn transaction(&self, q: &QueryBuf) -> Result<Value, sqlx::Error>;

    /// Insert `rows` into `table` as one unit; returns the inserted row count.
    async fn bulk(&self, table: &Table, rows: &[Row]) -> Result<u64, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        PgDatabase { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PgDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, q: &QueryBuf) -> Result<Vec<Row>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_params(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn transaction(&self, q: &QueryBuf) -> Result<Value, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let done = bind_params(sqlx::query(&q.sql), &q.params)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Value::from(done.rows_affected()))
    }

    async fn bulk(&self, table: &Table, rows: &[Row]) -> Result<u64, sqlx::Error> {
        let per_row = table.columns.len().max(1);
        let chunk = (MAX_BIND_PARAMS / per_row).max(1);
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for part in rows.chunks(chunk) {
            let Some(q) = insert_bulk(Dialect::Postgres, table, part) else { continue };
            tracing::debug!(sql = %q.sql, rows = part.len(), "bulk insert (tx)");
            let done = bind_params(sqlx::query(&q.sql), &q.params)
                .execute(&mut *tx)
                .await?;
            inserted += done.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }
}

fn row_to_json(row: &PgRow) -> Row {
    use sqlx::Column;
    use sqlx::Row as _;
    let mut map = Row::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, col.ordinal()));
    }
    map
}

fn cell_to_value(row: &PgRow, idx: usize) -> Value {
    use sqlx::Row as _;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(idx) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(idx) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(idx) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(idx) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(idx) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(idx) {
        return j;
    }
    Value::Null
}
