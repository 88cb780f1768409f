//! Test support: an in-memory `Database` that records every call and replays scripted replies.

#![allow(dead_code)]

use async_trait::async_trait;
use schema_crud::config::Table;
use schema_crud::sql::QueryBuf;
use schema_crud::{build_registry, Database, Dialect, ModelConfig, ModelRegistry, Row};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One call received by the database.
#[derive(Clone, Debug, PartialEq)]
pub enum DbOp {
    Query { sql: String, params: Vec<Value> },
    Transaction { sql: String, params: Vec<Value> },
    Bulk { table: String, rows: Vec<Row> },
}

impl DbOp {
    pub fn sql(&self) -> &str {
        match self {
            DbOp::Query { sql, .. } | DbOp::Transaction { sql, .. } => sql,
            DbOp::Bulk { .. } => "",
        }
    }
}

/// Scripted reply for the next call.
#[derive(Clone, Debug)]
pub enum Reply {
    Rows(Vec<Row>),
    Value(Value),
    Fail(String),
}

pub struct RecordingDatabase {
    dialect: Dialect,
    ops_log: Mutex<Vec<DbOp>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl RecordingDatabase {
    pub fn new(dialect: Dialect) -> Self {
        RecordingDatabase {
            dialect,
            ops_log: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
        }
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn ops(&self) -> Vec<DbOp> {
        self.ops_log.lock().unwrap().clone()
    }

    fn record(&self, op: DbOp) -> Option<Reply> {
        self.ops_log.lock().unwrap().push(op);
        self.replies.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl Database for RecordingDatabase {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&self, q: &QueryBuf) -> Result<Vec<Row>, sqlx::Error> {
        match self.record(DbOp::Query {
            sql: q.sql.clone(),
            params: q.params.clone(),
        }) {
            None => Ok(Vec::new()),
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(msg)) => Err(sqlx::Error::Protocol(msg)),
            Some(other) => panic!("query got reply {:?}", other),
        }
    }

    async fn transaction(&self, q: &QueryBuf) -> Result<Value, sqlx::Error> {
        match self.record(DbOp::Transaction {
            sql: q.sql.clone(),
            params: q.params.clone(),
        }) {
            None => Ok(json!(1)),
            Some(Reply::Value(v)) => Ok(v),
            Some(Reply::Fail(msg)) => Err(sqlx::Error::Protocol(msg)),
            Some(other) => panic!("transaction got reply {:?}", other),
        }
    }

    async fn bulk(&self, table: &Table, rows: &[Row]) -> Result<u64, sqlx::Error> {
        match self.record(DbOp::Bulk {
            table: table.name.clone(),
            rows: rows.to_vec(),
        }) {
            None => Ok(rows.len() as u64),
            Some(Reply::Fail(msg)) => Err(sqlx::Error::Protocol(msg)),
            Some(other) => panic!("bulk got reply {:?}", other),
        }
    }
}

pub fn row(v: Value) -> Row {
    v.as_object().cloned().expect("row fixture must be an object")
}

pub fn count_rows(n: u64) -> Reply {
    Reply::Rows(vec![row(json!({ "counts": n }))])
}

/// `app-users` (id, name, deptRef -> hr-dept) and `app-members` (composite key).
pub fn registry() -> ModelRegistry {
    let users: ModelConfig = serde_json::from_value(json!({
        "module": "app",
        "model": "users",
        "table": {
            "name": "users",
            "columns": [
                { "name": "id", "primary": true },
                { "name": "name" },
                { "name": "deptRef" }
            ]
        },
        "schema": {
            "fields": {
                "name": { "ctrltype": "string" },
                "deptRef": {
                    "ctrltype": "ref",
                    "ref": "hr-dept",
                    "refOptions": { "value": "id", "display": "title" }
                }
            }
        }
    }))
    .unwrap();
    let members: ModelConfig = serde_json::from_value(json!({
        "module": "app",
        "model": "members",
        "table": {
            "name": "members",
            "columns": [
                { "name": "groupId", "primary": true },
                { "name": "userId", "primary": true },
                { "name": "role" }
            ]
        },
        "schema": { "fields": { "role": {} } }
    }))
    .unwrap();
    let keyless: ModelConfig = serde_json::from_value(json!({
        "module": "app",
        "model": "audit",
        "table": { "name": "audit", "columns": [{ "name": "line" }] },
        "schema": { "fields": { "line": {} } }
    }))
    .unwrap();
    build_registry(&[users, members, keyless]).unwrap()
}
