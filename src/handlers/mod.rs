//! HTTP handlers for entity CRUD and resource metadata.

pub mod entity;
pub mod fallback;
pub mod meta;
pub use entity::*;
pub use fallback::*;
pub use meta::*;
