//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from a registry entry.
//! Values are bound as text and cast per field type; rows come back as JSON via row_to_json.

use crate::config::ResourceEntry;
use crate::query::{CompiledQuery, FilterClause, Operator};
use crate::response::Page;
use crate::service::coerce::bind_text;
use serde_json::{Map, Value};

/// Alias for the main table so row_to_json can reference the whole row.
const ROW_ALIAS: &str = "t";

/// Quote identifier for PostgreSQL (safe: only from validated definitions).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(entry: &ResourceEntry) -> String {
    match &entry.db_schema {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&entry.table)),
        None => quoted(&entry.table),
    }
}

/// Escape LIKE metacharacters; pairs with `ESCAPE '\'`.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Option<String>>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: Option<String>) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Placeholder with a cast, e.g. `$2::integer`.
    fn push_cast(&mut self, v: Option<String>, cast: &str) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, cast)
    }
}

fn clause_sql(entry: &ResourceEntry, clause: &FilterClause, q: &mut QueryBuf) -> Option<String> {
    let field = entry.schema.get(&clause.field)?;
    let col = quoted(&field.name);
    let cast = field.field_type.pg_cast();
    let bind = |raw: &str| bind_text(&field.field_type, &Value::String(raw.to_string()));
    let raw = clause.value.as_scalar();

    let compare = |q: &mut QueryBuf, op: &str| format!("{} {} {}", col, op, q.push_cast(bind(raw), cast));
    let membership = |q: &mut QueryBuf, op: &str| {
        let placeholders: Vec<String> = clause
            .value
            .items()
            .into_iter()
            .map(|item| q.push_cast(bind(item), cast))
            .collect();
        format!("{} {} ({})", col, op, placeholders.join(", "))
    };

    Some(match clause.operator {
        Operator::Eq => compare(q, "="),
        Operator::Lt => compare(q, "<"),
        Operator::Lte => compare(q, "<="),
        Operator::Gt => compare(q, ">"),
        Operator::Gte => compare(q, ">="),
        Operator::Null if clause.wants_null() => format!("{} IS NULL", col),
        Operator::Null => format!("{} IS NOT NULL", col),
        Operator::StartsWith => {
            let n = q.push_param(Some(format!("{}%", escape_like(raw))));
            format!("{}::text ILIKE ${} ESCAPE '\\'", col, n)
        }
        Operator::Contains => {
            let n = q.push_param(Some(format!("%{}%", escape_like(raw))));
            format!("{}::text ILIKE ${} ESCAPE '\\'", col, n)
        }
        Operator::In => membership(q, "IN"),
        Operator::NotIn => membership(q, "NOT IN"),
    })
}

fn where_clause(entry: &ResourceEntry, query: &CompiledQuery, q: &mut QueryBuf) -> String {
    let parts: Vec<String> = query
        .clauses()
        .iter()
        .filter_map(|c| clause_sql(entry, c, q))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT matching rows ordered by primary key within the page window.
pub fn select_page(entry: &ResourceEntry, query: &CompiledQuery, page: Page) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(entry, query, &mut q);
    let limit = page.limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset = if page.offset > 0 {
        format!(" OFFSET {}", page.offset)
    } else {
        String::new()
    };
    q.sql = format!(
        "SELECT row_to_json({alias}) FROM {} {alias}{} ORDER BY {alias}.{}{}{}",
        qualified_table(entry),
        where_sql,
        quoted(entry.schema.primary_key()),
        limit,
        offset,
        alias = ROW_ALIAS,
    );
    q
}

pub fn count(entry: &ResourceEntry, query: &CompiledQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(entry, query, &mut q);
    q.sql = format!(
        "SELECT COUNT(*) FROM {} {}{}",
        qualified_table(entry),
        ROW_ALIAS,
        where_sql
    );
    q
}

fn pk_placeholder(entry: &ResourceEntry, pk: &Value, q: &mut QueryBuf) -> String {
    let field = entry.schema.primary_key_field();
    q.push_cast(bind_text(&field.field_type, pk), field.field_type.pg_cast())
}

/// SELECT by primary key.
pub fn select_by_id(entry: &ResourceEntry, pk: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = pk_placeholder(entry, pk, &mut q);
    q.sql = format!(
        "SELECT row_to_json({alias}) FROM {} {alias} WHERE {alias}.{} = {}",
        qualified_table(entry),
        quoted(entry.schema.primary_key()),
        ph,
        alias = ROW_ALIAS,
    );
    q
}

/// INSERT the editable fields present in the payload; the primary key is left to the database.
pub fn insert(entry: &ResourceEntry, payload: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for field in entry.schema.editable_fields() {
        let Some(v) = payload.get(&field.name) else { continue };
        cols.push(quoted(&field.name));
        placeholders.push(q.push_cast(bind_text(&field.field_type, v), field.field_type.pg_cast()));
    }
    let values = if cols.is_empty() {
        "DEFAULT VALUES".to_string()
    } else {
        format!("({}) VALUES ({})", cols.join(", "), placeholders.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {} AS {alias} {} RETURNING row_to_json({alias})",
        qualified_table(entry),
        values,
        alias = ROW_ALIAS,
    );
    q
}

/// UPDATE by primary key: SET only editable fields present in the payload.
pub fn update(entry: &ResourceEntry, pk: &Value, payload: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for field in entry.schema.editable_fields() {
        let Some(v) = payload.get(&field.name) else { continue };
        let ph = q.push_cast(bind_text(&field.field_type, v), field.field_type.pg_cast());
        sets.push(format!("{} = {}", quoted(&field.name), ph));
    }
    if sets.is_empty() {
        return select_by_id(entry, pk);
    }
    let ph = pk_placeholder(entry, pk, &mut q);
    q.sql = format!(
        "UPDATE {} AS {alias} SET {} WHERE {alias}.{} = {} RETURNING row_to_json({alias})",
        qualified_table(entry),
        sets.join(", "),
        quoted(entry.schema.primary_key()),
        ph,
        alias = ROW_ALIAS,
    );
    q
}

/// DELETE by primary key.
pub fn delete(entry: &ResourceEntry, pk: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = pk_placeholder(entry, pk, &mut q);
    q.sql = format!(
        "DELETE FROM {} AS {alias} WHERE {alias}.{} = {} RETURNING row_to_json({alias})",
        qualified_table(entry),
        quoted(entry.schema.primary_key()),
        ph,
        alias = ROW_ALIAS,
    );
    q
}
