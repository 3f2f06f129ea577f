//! User-facing message templates. `{}` placeholders are filled in order.

use crate::error::{ErrorKind, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMessages {
    pub invalid_json: String,
    pub invalid_field: String,
    pub invalid_filter_option: String,
    pub type_integer: String,
    pub type_boolean: String,
    pub type_datetime: String,
    pub primary_key_update_insert: String,
    pub non_nullable_field_insert: String,
    pub field_out_of_range: String,
    pub ok: String,
    pub row_created: String,
    pub row_updated: String,
    pub row_deleted: String,
    pub not_found: String,
    pub route_not_found: String,
    pub method_not_allowed: String,
}

impl Default for ResponseMessages {
    fn default() -> Self {
        ResponseMessages {
            invalid_json: "Invalid JSON input".into(),
            invalid_field: "Invalid field: {}. Valid fields: {}".into(),
            invalid_filter_option: "Invalid filter option: {}. Valid options: {}".into(),
            type_integer: "Value '{}' is not a valid integer".into(),
            type_boolean: "Value '{}' is not a valid boolean".into(),
            type_datetime: "Value '{}' is not a valid datetime, expected YYYY-MM-DD HH:MM:SS".into(),
            primary_key_update_insert: "The primary key cannot be set on insert or update".into(),
            non_nullable_field_insert: "Field '{}' cannot be null. Required fields: {}".into(),
            field_out_of_range: "Field '{}' is out of range, must be between {} and {}".into(),
            ok: "OK".into(),
            row_created: "Row {} created".into(),
            row_updated: "Row {} updated".into(),
            row_deleted: "Row {} deleted".into(),
            not_found: "Resource not found".into(),
            route_not_found: "Route not found".into(),
            method_not_allowed: "Method not allowed".into(),
        }
    }
}

/// Substitutes each `{}` in `template` with the next argument. Surplus placeholders are kept verbatim.
pub fn render(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(a) => out.push_str(&a.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Renders a JSON value for a message: strings without quotes, everything else as JSON.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list(items: &[impl AsRef<str>]) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
}

impl ResponseMessages {
    pub fn invalid_json(&self) -> ValidationError {
        ValidationError::new(ErrorKind::InvalidJson, self.invalid_json.clone())
    }

    pub fn invalid_field(&self, key: &str, known: &[impl AsRef<str>]) -> ValidationError {
        ValidationError::new(
            ErrorKind::InvalidField,
            render(&self.invalid_field, &[&key, &list(known)]),
        )
    }

    pub fn invalid_filter_option(&self, token: &str, supported: &[impl AsRef<str>]) -> ValidationError {
        ValidationError::new(
            ErrorKind::InvalidFilterOption,
            render(&self.invalid_filter_option, &[&token, &list(supported)]),
        )
    }

    pub fn type_integer(&self, value: &dyn Display) -> ValidationError {
        ValidationError::new(ErrorKind::TypeInteger, render(&self.type_integer, &[value]))
    }

    pub fn type_boolean(&self, value: &dyn Display) -> ValidationError {
        ValidationError::new(ErrorKind::TypeBoolean, render(&self.type_boolean, &[value]))
    }

    pub fn type_datetime(&self, value: &dyn Display) -> ValidationError {
        ValidationError::new(ErrorKind::TypeDatetime, render(&self.type_datetime, &[value]))
    }

    pub fn primary_key_update_insert(&self) -> ValidationError {
        ValidationError::new(ErrorKind::PrimaryKeyUpdateInsert, self.primary_key_update_insert.clone())
    }

    pub fn non_nullable_field_insert(&self, field: &str, required: &[impl AsRef<str>]) -> ValidationError {
        ValidationError::new(
            ErrorKind::NonNullableFieldInsert,
            render(&self.non_nullable_field_insert, &[&field, &list(required)]),
        )
    }

    pub fn field_out_of_range(&self, field: &str, min: i128, max: i128) -> ValidationError {
        ValidationError::new(
            ErrorKind::FieldOutOfRange,
            render(&self.field_out_of_range, &[&field, &min, &max]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_in_order() {
        assert_eq!(render("{} and {}", &[&1, &"two"]), "1 and two");
        assert_eq!(render("{} and {}", &[&1]), "1 and {}");
        assert_eq!(render("no placeholders", &[&1]), "no placeholders");
    }

    #[test]
    fn builds_errors_with_kind() {
        let m = ResponseMessages::default();
        let e = m.field_out_of_range("base_pay", -2147483647, 2147483647);
        assert_eq!(e.kind, ErrorKind::FieldOutOfRange);
        assert_eq!(
            e.message,
            "Field 'base_pay' is out of range, must be between -2147483647 and 2147483647"
        );
        let e = m.invalid_field("nope", &["id", "name"]);
        assert_eq!(e.message, "Invalid field: nope. Valid fields: id, name");
    }

    #[test]
    fn display_value_unquotes_strings() {
        assert_eq!(display_value(&Value::String("abc".into())), "abc");
        assert_eq!(display_value(&serde_json::json!(1.5)), "1.5");
        assert_eq!(display_value(&Value::Null), "null");
    }
}
