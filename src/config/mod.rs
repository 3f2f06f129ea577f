pub mod types;
pub mod messages;
pub mod loader;
pub mod validator;
pub mod resolved;

pub use types::*;
pub use messages::ResponseMessages;
pub use loader::*;
pub use validator::*;
pub use resolved::*;
