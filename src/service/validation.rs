//! Request payload validation against a model schema.

use crate::config::ResponseMessages;
use crate::error::ValidationError;
use crate::schema::ModelSchema;
use crate::service::coerce::{as_integer, check_value};
use axum::http::Method;
use serde_json::{Map, Value};

/// Whether a payload creates a row or updates one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMethod {
    Create,
    Update,
}

impl WriteMethod {
    /// POST creates; PUT and PATCH update.
    pub fn from_http(method: &Method) -> Option<Self> {
        if *method == Method::POST {
            Some(WriteMethod::Create)
        } else if *method == Method::PUT || *method == Method::PATCH {
            Some(WriteMethod::Update)
        } else {
            None
        }
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Parse a raw request body. Malformed JSON is `InvalidJSON`.
    pub fn parse(body: &[u8], messages: &ResponseMessages) -> Result<Value, ValidationError> {
        serde_json::from_slice(body).map_err(|_| messages.invalid_json())
    }

    /// Runs every stage in order and stops at the first failure. Returns the
    /// payload object on success.
    pub fn validate(
        method: WriteMethod,
        payload: &Value,
        schema: &ModelSchema,
        messages: &ResponseMessages,
    ) -> Result<Map<String, Value>, ValidationError> {
        let Value::Object(body) = payload else {
            return Err(messages.invalid_json());
        };

        // Primary key is rejected before anything else looks at the payload.
        if body.contains_key(schema.primary_key()) {
            return Err(messages.primary_key_update_insert());
        }

        let editable: Vec<&str> = schema.editable_fields().map(|f| f.name.as_str()).collect();
        for key in body.keys() {
            if schema.editable_field(key).is_none() {
                return Err(messages.invalid_field(key, editable.as_slice()));
            }
        }

        for (key, v) in body {
            if v.is_null() {
                continue;
            }
            if let Some(field) = schema.editable_field(key) {
                check_value(field, v, messages)?;
            }
        }

        for field in schema.editable_fields() {
            if field.nullable {
                continue;
            }
            let rejected = match (method, body.get(&field.name)) {
                (WriteMethod::Create, None) => true,
                (_, Some(Value::Null)) => true,
                _ => false,
            };
            if rejected {
                return Err(messages.non_nullable_field_insert(&field.name, schema.required_fields()));
            }
        }

        for (key, v) in body {
            let Some(field) = schema.editable_field(key) else { continue };
            let Some(max) = field.max_length else { continue };
            let len = match v {
                Value::Null => continue,
                Value::String(s) => s.chars().count(),
                other => other.to_string().chars().count(),
            };
            if len > max as usize {
                return Err(messages.field_out_of_range(key, 0, max as i128));
            }
        }

        for (key, v) in body {
            let Some(field) = schema.editable_field(key) else { continue };
            let Some((min, max)) = field.field_type.int_range() else { continue };
            if let Some(n) = as_integer(v) {
                if n < min || n > max {
                    return Err(messages.field_out_of_range(key, min, max));
                }
            }
        }

        Ok(body.clone())
    }
}
