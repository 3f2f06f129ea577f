//! Query-string filter grammar and compiled predicates.

mod filter;
pub use filter::*;
