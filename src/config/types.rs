//! Raw model definitions and engine settings.

use crate::config::ResponseMessages;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, rename = "null")]
    pub nullable: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
    /// Target resource name for `foreign_key` fields.
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub related_name: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, type_: impl Into<String>) -> Self {
        FieldDefinition {
            name: name.into(),
            type_: type_.into(),
            nullable: false,
            max_length: None,
            references: None,
            related_name: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn references(mut self, resource: impl Into<String>) -> Self {
        self.references = Some(resource.into());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Resource name; also the default table name and route.
    pub name: String,
    #[serde(default)]
    pub route_url: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    /// Database schema qualifying the table, if any.
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    pub fields: Vec<FieldDefinition>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        ModelDefinition {
            name: name.into(),
            route_url: None,
            table: None,
            schema: None,
            page_size: None,
            fields,
        }
    }

    pub fn route_url(&self) -> String {
        self.route_url
            .clone()
            .unwrap_or_else(|| format!("/{}", self.name))
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Settings shared by every registered resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    pub page_size: u32,
    pub max_body_bytes: usize,
    pub messages: ResponseMessages,
}

impl Default for CrudConfig {
    fn default() -> Self {
        CrudConfig {
            page_size: DEFAULT_PAGE_SIZE,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            messages: ResponseMessages::default(),
        }
    }
}

impl CrudConfig {
    /// Defaults overridden by `CRUD_PAGE_SIZE` and `CRUD_MAX_BODY_BYTES`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = CrudConfig::default();
        if let Some(n) = env_parse::<u32>("CRUD_PAGE_SIZE").filter(|n| *n > 0) {
            config.page_size = n;
        }
        if let Some(n) = env_parse::<usize>("CRUD_MAX_BODY_BYTES") {
            config.max_body_bytes = n;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
