//! Immutable per-entity field schema.

use crate::error::ConfigError;
use crate::schema::FieldSchema;
use std::collections::HashMap;

/// Ordered, read-only set of fields for one entity. Built once at startup.
#[derive(Clone, Debug)]
pub struct ModelSchema {
    name: String,
    fields: Vec<FieldSchema>,
    index: HashMap<String, usize>,
    primary_key: usize,
    required: Vec<String>,
}

impl ModelSchema {
    /// Builds the schema. Exactly one field must be the primary key and
    /// field names must be unique.
    pub fn build(name: impl Into<String>, fields: Vec<FieldSchema>) -> Result<Self, ConfigError> {
        let name = name.into();
        let mut index = HashMap::with_capacity(fields.len());
        for (i, f) in fields.iter().enumerate() {
            if index.insert(f.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateField {
                    model: name,
                    field: f.name.clone(),
                });
            }
        }

        let pks: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_primary_key())
            .map(|(i, _)| i)
            .collect();
        let primary_key = match pks.as_slice() {
            [] => return Err(ConfigError::MissingPrimaryKey { model: name }),
            [pk] => *pk,
            _ => {
                return Err(ConfigError::MultiplePrimaryKeys {
                    model: name,
                    fields: pks.iter().map(|i| fields[*i].name.clone()).collect(),
                })
            }
        };

        let required = fields
            .iter()
            .filter(|f| !f.nullable && !f.is_primary_key())
            .map(|f| f.name.clone())
            .collect();

        Ok(ModelSchema {
            name,
            fields,
            index,
            primary_key,
            required,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.index.get(name).map(|i| &self.fields[*i])
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn primary_key(&self) -> &str {
        &self.fields[self.primary_key].name
    }

    pub fn primary_key_field(&self) -> &FieldSchema {
        &self.fields[self.primary_key]
    }

    /// Non-nullable fields other than the primary key, in declaration order.
    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Every field except the primary key.
    pub fn editable_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| !f.is_primary_key())
    }

    pub fn editable_field(&self, name: &str) -> Option<&FieldSchema> {
        self.get(name).filter(|f| !f.is_primary_key())
    }
}
