//! Routers built from the model registry.

pub mod entity;
pub use entity::entity_routes;
