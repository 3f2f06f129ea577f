//! Generic CRUD execution against the persistence collaborator.

use crate::config::messages::display_value;
use crate::config::{IncludeDirection, Registry, ResourceEntry};
use crate::error::StoreError;
use crate::query::CompiledQuery;
use crate::response::{paginate, Page, Pagination};
use crate::store::Persistence;
use serde_json::{Map, Value};

pub struct CrudService;

impl CrudService {
    /// One page of matching rows plus the page count. With `include_related`,
    /// each row carries its related records.
    pub async fn list(
        store: &dyn Persistence,
        registry: &Registry,
        entry: &ResourceEntry,
        query: &CompiledQuery,
        page: u64,
        include_related: bool,
    ) -> Result<(Vec<Value>, Pagination), StoreError> {
        let total = store.count(entry, query).await?;
        let pagination = paginate(total, entry.page_size, page);
        let mut rows = store.fetch(entry, query, pagination.window).await?;
        if include_related {
            Self::embed_related(store, registry, entry, &mut rows).await?;
        }
        Ok((rows, pagination))
    }

    /// to_one includes replace the FK value with the referenced row; to_many
    /// includes add the list of referencing rows.
    pub async fn embed_related(
        store: &dyn Persistence,
        registry: &Registry,
        entry: &ResourceEntry,
        rows: &mut [Value],
    ) -> Result<(), StoreError> {
        for include in &entry.includes {
            let related = registry
                .get(&include.related_resource)
                .ok_or_else(|| StoreError::UnknownResource(include.related_resource.clone()))?;
            for row in rows.iter_mut() {
                let Value::Object(obj) = row else { continue };
                let key = obj.get(&include.our_key).cloned().unwrap_or(Value::Null);
                let embedded = match include.direction {
                    IncludeDirection::ToOne if key.is_null() => Value::Null,
                    IncludeDirection::ToOne => store.get(related, &key).await?.unwrap_or(Value::Null),
                    IncludeDirection::ToMany => {
                        let query = CompiledQuery::field_eq(&include.their_key, display_value(&key));
                        Value::Array(store.fetch(related, &query, Page::all()).await?)
                    }
                };
                obj.insert(include.name.clone(), embedded);
            }
        }
        Ok(())
    }

    pub async fn read(store: &dyn Persistence, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError> {
        store.get(entry, pk).await
    }

    pub async fn create(
        store: &dyn Persistence,
        entry: &ResourceEntry,
        payload: &Map<String, Value>,
    ) -> Result<Value, StoreError> {
        let row = store.create(entry, payload).await?;
        tracing::debug!(resource = %entry.name, pk = %row[entry.schema.primary_key()], "row created");
        Ok(row)
    }

    pub async fn update(
        store: &dyn Persistence,
        entry: &ResourceEntry,
        pk: &Value,
        payload: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        store.update(entry, pk, payload).await
    }

    pub async fn delete(store: &dyn Persistence, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError> {
        store.delete(entry, pk).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, CrudConfig, FieldDefinition, ModelDefinition};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn registry() -> Registry {
        let mut job_fk = FieldDefinition::new("job", "foreign_key").references("job").nullable();
        job_fk.related_name = Some("people".into());
        let defs = vec![
            ModelDefinition::new(
                "job",
                vec![FieldDefinition::new("id", "primary_key"), FieldDefinition::new("name", "string")],
            ),
            ModelDefinition::new(
                "person",
                vec![FieldDefinition::new("id", "primary_key"), FieldDefinition::new("name", "string"), job_fk],
            ),
        ];
        let mut config = CrudConfig::default();
        config.page_size = 2;
        resolve(&defs, &config).unwrap()
    }

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn list_paginates() {
        let registry = registry();
        let job = registry.get("job").unwrap();
        let store = MemoryStore::new();
        for name in ["a", "b", "c", "d", "e"] {
            store.create(job, &body(json!({"name": name}))).await.unwrap();
        }
        let (rows, p) = CrudService::list(&store, &registry, job, &CompiledQuery::new(), 3, false)
            .await
            .unwrap();
        assert_eq!(p.total_pages, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("e"));
    }

    #[tokio::test]
    async fn embeds_related_rows() {
        let registry = registry();
        let job = registry.get("job").unwrap();
        let person = registry.get("person").unwrap();
        let store = MemoryStore::new();
        store.create(job, &body(json!({"name": "Space garbage man"}))).await.unwrap();
        store.create(person, &body(json!({"name": "Sanic", "job": 1}))).await.unwrap();
        store.create(person, &body(json!({"name": "Idle", "job": null}))).await.unwrap();

        let (people, _) = CrudService::list(&store, &registry, person, &CompiledQuery::new(), 1, true)
            .await
            .unwrap();
        assert_eq!(people[0]["job"]["name"], json!("Space garbage man"));
        assert_eq!(people[1]["job"], Value::Null);

        let (jobs, _) = CrudService::list(&store, &registry, job, &CompiledQuery::new(), 1, true)
            .await
            .unwrap();
        let embedded = jobs[0]["people"].as_array().unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0]["name"], json!("Sanic"));
    }
}
