//! Field and model schemas derived from model definitions.

mod field;
mod model;

pub use field::*;
pub use model::*;
