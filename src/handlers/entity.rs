//! Model CRUD handlers: create, list, one, update, delete.
//! Each resolves the model from the path, then hands the request to `CrudService`.

use crate::error::AppError;
use crate::response::{CreateBody, ListBody};
use crate::service::{CrudService, ListParams, ListRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

pub async fn list(
    State(state): State<AppState>,
    Path((module_code, model_code)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListBody>, AppError> {
    let model = state.model(&module_code, &model_code)?;
    let req = ListRequest::from(params);
    let body = CrudService::list(state.db.as_ref(), &model, &req).await?;
    Ok(Json(body))
}

pub async fn one(
    State(state): State<AppState>,
    Path((module_code, model_code, id)): Path<(String, String, String)>,
) -> Result<Json<Value>, AppError> {
    let model = state.model(&module_code, &model_code)?;
    let row = CrudService::one(state.db.as_ref(), &model, Some(id.as_str())).await?;
    Ok(Json(row))
}

pub async fn create(
    State(state): State<AppState>,
    Path((module_code, model_code)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<CreateBody>, AppError> {
    let model = state.model(&module_code, &model_code)?;
    let created = CrudService::create(state.db.as_ref(), &model, body).await?;
    Ok(Json(created))
}

pub async fn update(
    State(state): State<AppState>,
    Path((module_code, model_code)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let model = state.model(&module_code, &model_code)?;
    let doc = CrudService::update(state.db.as_ref(), &model, body).await?;
    Ok(Json(doc))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((module_code, model_code)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let model = state.model(&module_code, &model_code)?;
    let result = CrudService::delete(state.db.as_ref(), &model, body).await?;
    Ok(Json(result))
}
