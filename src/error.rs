//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {kind} identifier '{value}'")]
    InvalidIdentifier { kind: &'static str, value: String },
    #[error("duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },
    #[error("field '{field}' has no column in table {table}")]
    UnknownFieldColumn { field: String, table: String },
    #[error("field '{field}': invalid reference '{value}' (expected <module>-<model>)")]
    InvalidReference { field: String, value: String },
    #[error("field '{field}': ctrltype '{ctrltype}' cannot carry a reference")]
    UnsupportedRefControl { field: String, ctrltype: String },
    #[error("field '{field}': {message}")]
    InvalidField { field: String, message: String },
    #[error("table {table} has no primary key")]
    NoPrimaryKey { table: String },
    #[error("duplicate model: {0}")]
    DuplicateModel(String),
    #[error("model load: {0}")]
    Load(String),
}

/// The dispatcher operation a database failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrudOp {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudOp {
    /// Generic user-facing message for a failed operation.
    pub fn user_message(self) -> &'static str {
        match self {
            CrudOp::Create => "failed to create object",
            CrudOp::Read => "failed to read object",
            CrudOp::Update => "failed to update object",
            CrudOp::Delete => "failed to delete object",
        }
    }
}

impl fmt::Display for CrudOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrudOp::Create => "create",
            CrudOp::Read => "read",
            CrudOp::Update => "update",
            CrudOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("id not specified")]
    MissingId,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{op} failed: {source}")]
    Crud {
        op: CrudOp,
        #[source]
        source: sqlx::Error,
    },
}

impl AppError {
    pub fn crud(op: CrudOp, source: sqlx::Error) -> Self {
        AppError::Crud { op, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingId | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Crud { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON payload sent to the client.
    pub fn payload(&self) -> serde_json::Value {
        use crate::response::{error_body, missing_id_body};
        match self {
            AppError::MissingId => missing_id_body(),
            AppError::Config(e) => error_body("model configuration error", e.to_string()),
            AppError::BadRequest(detail) => error_body("bad request", detail.clone()),
            AppError::NotFound(detail) => error_body("not found", detail.clone()),
            AppError::Crud { op, source } => error_body(op.user_message(), source.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.payload())).into_response()
    }
}
