//! Safe SQL builder: identifiers from validated definitions only, values as parameters.

mod builder;
pub use builder::*;
