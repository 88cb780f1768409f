//! HTTP handlers for model CRUD.

pub mod entity;
pub use entity::*;
