//! PostgreSQL store using the safe SQL builder.

use crate::config::ResourceEntry;
use crate::error::StoreError;
use crate::query::CompiledQuery;
use crate::response::Page;
use crate::sql::{self, QueryBuf};
use crate::store::Persistence;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn query_optional(&self, q: &QueryBuf) -> Result<Option<Value>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }
}

#[async_trait]
impl Persistence for PgStore {
    async fn fetch(&self, entry: &ResourceEntry, query: &CompiledQuery, page: Page) -> Result<Vec<Value>, StoreError> {
        self.query_many(&sql::select_page(entry, query, page)).await
    }

    async fn count(&self, entry: &ResourceEntry, query: &CompiledQuery) -> Result<u64, StoreError> {
        let q = sql::count(entry, query);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut count = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            count = count.bind(p.clone());
        }
        let n = count.fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn create(&self, entry: &ResourceEntry, payload: &Map<String, Value>) -> Result<Value, StoreError> {
        self.query_optional(&sql::insert(entry, payload))
            .await?
            .ok_or_else(|| StoreError::Db(sqlx::Error::RowNotFound))
    }

    async fn get(&self, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError> {
        self.query_optional(&sql::select_by_id(entry, pk)).await
    }

    async fn update(
        &self,
        entry: &ResourceEntry,
        pk: &Value,
        payload: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        self.query_optional(&sql::update(entry, pk, payload)).await
    }

    async fn delete(&self, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError> {
        self.query_optional(&sql::delete(entry, pk)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
