//! Crud Engine: schema-driven REST CRUD endpoints with validation and query filters.

pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{load_definitions, parse_definitions, resolve, CrudConfig, ModelDefinition, FieldDefinition, Registry, ResourceEntry};
pub use error::{AppError, ConfigError, ErrorKind, StoreError, ValidationError};
pub use query::{compile, CompiledQuery, FilterClause, FilterValue, Operator};
pub use response::{paginate, Envelope, Page, Pagination};
pub use routes::{app, common_routes, entity_routes};
pub use schema::{FieldSchema, FieldType, ModelSchema};
pub use service::{CrudService, RequestValidator, WriteMethod};
pub use state::AppState;
pub use store::{MemoryStore, Persistence, PgStore};
