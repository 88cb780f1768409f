//! Model CRUD routes. Handlers resolve the model from `:module/:model` on every request.

use crate::handlers::entity::{create, delete as delete_handler, list, one, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn entity_routes(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/:module/:model",
            get(list).post(create).put(update).delete(delete_handler),
        )
        .route("/:module/:model/:id", get(one))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}
