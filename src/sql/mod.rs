//! Safe SQL synthesis: identifiers from validated models only, values as parameters.

mod builder;
mod columns;
mod condition;
mod dialect;
mod join;
pub mod params;
mod sort;

pub use builder::*;
pub use columns::*;
pub use condition::*;
pub use dialect::*;
pub use join::*;
pub use params::*;
pub use sort::*;
