//! In-process store: one ordered table per resource, auto-increment primary keys.

use crate::config::ResourceEntry;
use crate::error::StoreError;
use crate::query::{CompiledQuery, FilterClause, Operator};
use crate::response::Page;
use crate::schema::ModelSchema;
use crate::service::coerce::{as_integer, normalize, typed_value};
use crate::store::Persistence;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Map<String, Value>>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Backend("memory store lock poisoned".into())
}

fn pk_of(pk: &Value) -> Option<i64> {
    as_integer(pk).and_then(|n| i64::try_from(n).ok())
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn matching(entry: &ResourceEntry, query: &CompiledQuery, table: Option<&Table>) -> Vec<Value> {
        let Some(table) = table else { return Vec::new() };
        table
            .rows
            .values()
            .filter(|row| query.clauses().iter().all(|c| clause_matches(&entry.schema, c, row)))
            .map(|row| Value::Object(row.clone()))
            .collect()
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn fetch(&self, entry: &ResourceEntry, query: &CompiledQuery, page: Page) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        let rows = Self::matching(entry, query, tables.get(&entry.name));
        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = page
            .limit
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, entry: &ResourceEntry, query: &CompiledQuery) -> Result<u64, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(Self::matching(entry, query, tables.get(&entry.name)).len() as u64)
    }

    async fn create(&self, entry: &ResourceEntry, payload: &Map<String, Value>) -> Result<Value, StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.entry(entry.name.clone()).or_default();
        table.last_id += 1;
        let id = table.last_id;

        let mut row = Map::new();
        for field in entry.schema.fields() {
            let v = if field.is_primary_key() {
                Value::from(id)
            } else {
                payload
                    .get(&field.name)
                    .map(|v| normalize(&field.field_type, v))
                    .unwrap_or(Value::Null)
            };
            row.insert(field.name.clone(), v);
        }
        table.rows.insert(id, row.clone());
        Ok(Value::Object(row))
    }

    async fn get(&self, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError> {
        let Some(id) = pk_of(pk) else { return Ok(None) };
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .get(&entry.name)
            .and_then(|t| t.rows.get(&id))
            .map(|row| Value::Object(row.clone())))
    }

    async fn update(
        &self,
        entry: &ResourceEntry,
        pk: &Value,
        payload: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let Some(id) = pk_of(pk) else { return Ok(None) };
        let mut tables = self.tables.write().map_err(poisoned)?;
        let Some(row) = tables.get_mut(&entry.name).and_then(|t| t.rows.get_mut(&id)) else {
            return Ok(None);
        };
        for (k, v) in payload {
            if let Some(field) = entry.schema.editable_field(k) {
                row.insert(k.clone(), normalize(&field.field_type, v));
            }
        }
        Ok(Some(Value::Object(row.clone())))
    }

    async fn delete(&self, entry: &ResourceEntry, pk: &Value) -> Result<Option<Value>, StoreError> {
        let Some(id) = pk_of(pk) else { return Ok(None) };
        let mut tables = self.tables.write().map_err(poisoned)?;
        Ok(tables
            .get_mut(&entry.name)
            .and_then(|t| t.rows.remove(&id))
            .map(Value::Object))
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => match (as_integer(a), as_integer(b)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.to_lowercase()),
        other => Some(other.to_string().to_lowercase()),
    }
}

fn clause_matches(schema: &ModelSchema, clause: &FilterClause, row: &Map<String, Value>) -> bool {
    let Some(field) = schema.get(&clause.field) else { return false };
    let current = row.get(&clause.field).unwrap_or(&Value::Null);
    if clause.operator == Operator::Null {
        return current.is_null() == clause.wants_null();
    }
    if current.is_null() {
        return false;
    }

    let target = || typed_value(&field.field_type, clause.value.as_scalar());
    let ordered = |want: fn(Ordering) -> bool| compare(current, &target()).map(want).unwrap_or(false);
    let equals_any = || {
        clause
            .value
            .items()
            .iter()
            .any(|raw| compare(current, &typed_value(&field.field_type, raw)) == Some(Ordering::Equal))
    };

    match clause.operator {
        Operator::Eq => ordered(|o| o == Ordering::Equal),
        Operator::Lt => ordered(|o| o == Ordering::Less),
        Operator::Lte => ordered(|o| o != Ordering::Greater),
        Operator::Gt => ordered(|o| o == Ordering::Greater),
        Operator::Gte => ordered(|o| o != Ordering::Less),
        Operator::StartsWith => text_of(current)
            .map(|s| s.starts_with(&clause.value.as_scalar().to_lowercase()))
            .unwrap_or(false),
        Operator::Contains => text_of(current)
            .map(|s| s.contains(&clause.value.as_scalar().to_lowercase()))
            .unwrap_or(false),
        Operator::In => equals_any(),
        Operator::NotIn => !equals_any(),
        Operator::Null => !clause.wants_null(),
    }
}
