//! Load model definitions from JSON and resolve them into a registry.

use crate::config::resolved::{IncludeDirection, IncludeSpec, Registry, ResourceEntry};
use crate::config::{validate, CrudConfig, FieldDefinition, ModelDefinition};
use crate::error::ConfigError;
use crate::schema::{FieldSchema, FieldType, ModelSchema};
use std::collections::HashMap;
use std::path::Path;

/// Build the registry from definitions. Fails on the first invalid definition.
pub fn resolve(definitions: &[ModelDefinition], config: &CrudConfig) -> Result<Registry, ConfigError> {
    validate(definitions)?;

    let mut schemas = Vec::with_capacity(definitions.len());
    for def in definitions {
        schemas.push(build_schema(def)?);
    }

    let mut entries = Vec::with_capacity(definitions.len());
    for (def, schema) in definitions.iter().zip(schemas.iter()) {
        let includes = build_includes(def, schema, definitions, &schemas);
        entries.push(ResourceEntry {
            name: def.name.clone(),
            route_url: def.route_url(),
            table: def.table.clone().unwrap_or_else(|| def.name.clone()),
            db_schema: def.schema.clone(),
            page_size: def.page_size.filter(|n| *n > 0).unwrap_or(config.page_size),
            schema: schema.clone(),
            includes,
        });
    }

    let registry = Registry::from_entries(entries);
    tracing::info!(
        resources = ?registry.entries().iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        "registry built"
    );
    Ok(registry)
}

/// Derive the field schema of one model definition.
pub fn build_schema(def: &ModelDefinition) -> Result<ModelSchema, ConfigError> {
    let fields = def
        .fields
        .iter()
        .map(|f| build_field(&def.name, f))
        .collect::<Result<Vec<_>, _>>()?;
    ModelSchema::build(def.name.clone(), fields)
}

fn build_field(model: &str, f: &FieldDefinition) -> Result<FieldSchema, ConfigError> {
    let field_type = FieldType::parse(&f.type_, f.references.as_deref()).ok_or_else(|| {
        if f.type_.eq_ignore_ascii_case("foreign_key") {
            ConfigError::MissingReference {
                kind: "foreign key target",
                id: format!("{}.{}", model, f.name),
            }
        } else {
            ConfigError::UnknownFieldType {
                model: model.to_string(),
                field: f.name.clone(),
                type_name: f.type_.clone(),
            }
        }
    })?;
    let mut schema = FieldSchema::new(f.name.clone(), field_type).nullable(f.nullable);
    if let Some(n) = f.max_length {
        schema = schema.max_length(n);
    }
    schema.related_name = f.related_name.clone();
    Ok(schema)
}

fn build_includes(
    def: &ModelDefinition,
    schema: &ModelSchema,
    definitions: &[ModelDefinition],
    schemas: &[ModelSchema],
) -> Vec<IncludeSpec> {
    let pk_by_name: HashMap<&str, &str> = definitions
        .iter()
        .zip(schemas.iter())
        .map(|(d, s)| (d.name.as_str(), s.primary_key()))
        .collect();

    let mut includes = Vec::new();
    for field in schema.fields() {
        if let Some(target) = field.references() {
            if let Some(their_pk) = pk_by_name.get(target) {
                includes.push(IncludeSpec {
                    name: field.name.clone(),
                    direction: IncludeDirection::ToOne,
                    related_resource: target.to_string(),
                    our_key: field.name.clone(),
                    their_key: (*their_pk).to_string(),
                });
            }
        }
    }
    for (other_def, other) in definitions.iter().zip(schemas.iter()) {
        for field in other.fields() {
            if field.references() == Some(def.name.as_str()) {
                includes.push(IncludeSpec {
                    name: field.related_name.clone().unwrap_or_else(|| other_def.name.clone()),
                    direction: IncludeDirection::ToMany,
                    related_resource: other_def.name.clone(),
                    our_key: schema.primary_key().to_string(),
                    their_key: field.name.clone(),
                });
            }
        }
    }
    includes
}

/// Parse a JSON array of model definitions.
pub fn parse_definitions(json: &str) -> Result<Vec<ModelDefinition>, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Read a JSON array of model definitions from a file.
pub async fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<ModelDefinition>, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading model definitions");
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_definitions(&raw)
}
