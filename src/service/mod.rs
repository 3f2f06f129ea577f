//! CrudService, request validation and type coercion.

pub mod coerce;
mod crud;
mod validation;
pub use crud::CrudService;
pub use validation::{RequestValidator, WriteMethod};
