//! Shared application state for all routes.

use crate::config::{ModelRegistry, ResolvedModel};
use crate::db::Database;
use crate::error::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    /// Loaded once at startup; models are immutable for the life of the process.
    pub registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, registry: ModelRegistry) -> Self {
        AppState {
            db,
            registry: Arc::new(registry),
        }
    }

    pub fn model(&self, module_code: &str, model_code: &str) -> Result<Arc<ResolvedModel>, AppError> {
        self.registry
            .get(module_code, model_code)
            .ok_or_else(|| AppError::NotFound(format!("model {}-{}", module_code, model_code)))
    }
}
