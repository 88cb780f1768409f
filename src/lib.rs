//! Schema CRUD: schema-driven SQL synthesis and generic CRUD dispatch.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;

pub use config::{build_registry, load_registry_from_dir, resolve, ModelConfig, ModelRegistry, ResolvedModel};
pub use db::{Database, PgDatabase};
pub use error::{AppError, ConfigError, CrudOp};
pub use response::{CreateBody, ListBody, Row};
pub use routes::entity_routes;
pub use service::{CrudService, ListParams, ListRequest};
pub use settings::Settings;
pub use sql::Dialect;
pub use state::AppState;
