//! CrudService: generic CRUD using the safe SQL builder.

mod crud;
mod validation;
pub use crud::{default_primary_keys, CrudService};
pub use validation::{ListParams, ListRequest, RequestValidator, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
