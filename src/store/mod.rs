//! Persistence collaborator: executes compiled queries and row mutations.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::ResourceEntry;
use crate::error::StoreError;
use crate::query::CompiledQuery;
use crate::response::Page;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Backing store for registered resources. Payloads reaching `create` and
/// `update` have already passed validation.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Rows matching every clause, ordered by primary key, restricted to `page`.
    async fn fetch(&self, entry: &ResourceEntry, query: &CompiledQuery, page: Page) -> Result<Vec<Value>, StoreError>;

    async fn count(&self, entry: &ResourceEntry, query: &CompiledQuery) -> Result<u64, StoreError>;

    /// Inserts a row and returns it with its assigned primary key.
    async fn create(&self, entry: &ResourceEntry, payload: &Map<String, Value>) -> Result<Value, StoreError>;

    async fn get(&self, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError>;

    async fn update(
        &self,
        entry: &ResourceEntry,
        pk: &Value,
        payload: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    /// Removes a row and returns it, or None when absent.
    async fn delete(&self, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
