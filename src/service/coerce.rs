//! Type coercion rules shared by payload validation, filter compilation and the stores.

use crate::config::messages::display_value;
use crate::config::ResponseMessages;
use crate::error::ValidationError;
use crate::schema::{FieldSchema, FieldType};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::num::IntErrorKind;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok()
}

/// Integer view of a value when the conversion is lossless. Integer strings
/// too large for i128 saturate so range checks still reject them.
pub fn as_integer(v: &Value) -> Option<i128> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i as i128)
            } else if let Some(u) = n.as_u64() {
                Some(u as i128)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i128)
            }
        }
        Value::Bool(b) => Some(*b as i128),
        Value::String(s) => parse_integer(s.trim()),
        _ => None,
    }
}

fn parse_integer(s: &str) -> Option<i128> {
    match s.parse::<i128>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i128::MAX),
            IntErrorKind::NegOverflow => Some(i128::MIN),
            _ => None,
        },
    }
}

/// Checks that `v` is acceptable for the field's type. Null is not checked here.
pub fn check_value(field: &FieldSchema, v: &Value, messages: &ResponseMessages) -> Result<(), ValidationError> {
    match &field.field_type {
        FieldType::Int | FieldType::BigInt | FieldType::PrimaryKey | FieldType::ForeignKey { .. } => {
            as_integer(v)
                .map(|_| ())
                .ok_or_else(|| messages.type_integer(&display_value(v)))
        }
        FieldType::Bool => as_integer(v)
            .map(|_| ())
            .ok_or_else(|| messages.type_boolean(&display_value(v))),
        FieldType::Datetime => v
            .as_str()
            .and_then(parse_datetime)
            .map(|_| ())
            .ok_or_else(|| messages.type_datetime(&display_value(v))),
        FieldType::String | FieldType::Text => match v {
            Value::Array(_) | Value::Object(_) => Err(messages.invalid_json()),
            _ => Ok(()),
        },
    }
}

/// Same as [`check_value`] for a raw query-string token.
pub fn check_raw(field: &FieldSchema, raw: &str, messages: &ResponseMessages) -> Result<(), ValidationError> {
    check_value(field, &Value::String(raw.to_string()), messages)
}

/// [`check_raw`] plus the integer bounds of the field's type.
pub fn check_raw_in_range(field: &FieldSchema, raw: &str, messages: &ResponseMessages) -> Result<(), ValidationError> {
    check_raw(field, raw, messages)?;
    let Some((min, max)) = field.field_type.int_range() else { return Ok(()) };
    match parse_integer(raw.trim()) {
        Some(n) if n < min || n > max => Err(messages.field_out_of_range(&field.name, min, max)),
        _ => Ok(()),
    }
}

/// Converts an accepted value into its stored JSON form: integers as numbers,
/// bools as booleans, datetimes in the zero-padded `DATETIME_FORMAT` rendering.
pub fn normalize(field_type: &FieldType, v: &Value) -> Value {
    if v.is_null() {
        return Value::Null;
    }
    match field_type {
        FieldType::Int | FieldType::BigInt | FieldType::PrimaryKey | FieldType::ForeignKey { .. } => {
            match as_integer(v).and_then(|i| i64::try_from(i).ok()) {
                Some(i) => Value::from(i),
                None => v.clone(),
            }
        }
        FieldType::Bool => match as_integer(v) {
            Some(i) => Value::Bool(i != 0),
            None => v.clone(),
        },
        FieldType::String | FieldType::Text => match v {
            Value::String(_) => v.clone(),
            other => Value::String(other.to_string()),
        },
        FieldType::Datetime => match v.as_str().and_then(parse_datetime) {
            Some(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
            None => v.clone(),
        },
    }
}

/// Typed form of a raw filter token.
pub fn typed_value(field_type: &FieldType, raw: &str) -> Value {
    normalize(field_type, &Value::String(raw.to_string()))
}

/// Text form used when binding a value as a SQL parameter.
pub fn bind_text(field_type: &FieldType, v: &Value) -> Option<String> {
    match normalize(field_type, v) {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn msgs() -> ResponseMessages {
        ResponseMessages::default()
    }

    #[test]
    fn integers_must_be_lossless() {
        assert_eq!(as_integer(&json!(15)), Some(15));
        assert_eq!(as_integer(&json!("15")), Some(15));
        assert_eq!(as_integer(&json!(" -3 ")), Some(-3));
        assert_eq!(as_integer(&json!(4.0)), Some(4));
        assert_eq!(as_integer(&json!(true)), Some(1));
        assert_eq!(as_integer(&json!(4.5)), None);
        assert_eq!(as_integer(&json!("abc")), None);
        assert_eq!(as_integer(&json!("")), None);
        assert_eq!(as_integer(&json!([1])), None);
        assert_eq!(as_integer(&json!(9223372036854775808u64)), Some(9223372036854775808));
    }

    #[test]
    fn huge_integer_strings_saturate() {
        let s = "9".repeat(60);
        assert_eq!(as_integer(&json!(s)), Some(i128::MAX));
        assert_eq!(as_integer(&json!(format!("-{}", s))), Some(i128::MIN));
    }

    #[test]
    fn type_errors_by_field_type() {
        let int = FieldSchema::new("base_pay", FieldType::Int);
        let err = check_value(&int, &json!("abc"), &msgs()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeInteger);
        assert!(err.message.contains("abc"));

        let flag = FieldSchema::new("active", FieldType::Bool);
        assert!(check_value(&flag, &json!(1), &msgs()).is_ok());
        assert_eq!(
            check_value(&flag, &json!("yes"), &msgs()).unwrap_err().kind,
            ErrorKind::TypeBoolean
        );

        let when = FieldSchema::new("created", FieldType::Datetime);
        assert!(check_value(&when, &json!("2024-01-31 12:30:00"), &msgs()).is_ok());
        assert_eq!(
            check_value(&when, &json!("2024-01-31T12:30:00"), &msgs()).unwrap_err().kind,
            ErrorKind::TypeDatetime
        );
        assert_eq!(
            check_value(&when, &json!(20240131), &msgs()).unwrap_err().kind,
            ErrorKind::TypeDatetime
        );

        let name = FieldSchema::new("name", FieldType::String);
        assert!(check_value(&name, &json!(12), &msgs()).is_ok());
        assert!(check_value(&name, &json!(true), &msgs()).is_ok());
    }

    #[test]
    fn text_fields_reject_nested_values() {
        let name = FieldSchema::new("name", FieldType::String);
        let err = check_value(&name, &json!({"nested": [1, 2]}), &msgs()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidJson);
        let notes = FieldSchema::new("notes", FieldType::Text);
        assert_eq!(
            check_value(&notes, &json!(["a"]), &msgs()).unwrap_err().kind,
            ErrorKind::InvalidJson
        );
    }

    #[test]
    fn raw_tokens_respect_integer_bounds() {
        let pay = FieldSchema::new("base_pay", FieldType::Int);
        assert!(check_raw_in_range(&pay, "2147483647", &msgs()).is_ok());
        let err = check_raw_in_range(&pay, "99999999999", &msgs()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FieldOutOfRange);
        assert!(err.message.contains("base_pay"));

        let id = FieldSchema::new("id", FieldType::PrimaryKey);
        assert!(check_raw_in_range(&id, "9223372036854775807", &msgs()).is_ok());
        assert_eq!(
            check_raw_in_range(&id, "9223372036854775808", &msgs()).unwrap_err().kind,
            ErrorKind::FieldOutOfRange
        );
        assert_eq!(
            check_raw_in_range(&pay, "ten", &msgs()).unwrap_err().kind,
            ErrorKind::TypeInteger
        );

        let name = FieldSchema::new("name", FieldType::String);
        assert!(check_raw_in_range(&name, "99999999999", &msgs()).is_ok());
    }

    #[test]
    fn datetimes_normalize_to_padded_form() {
        assert_eq!(
            normalize(&FieldType::Datetime, &json!("2024-1-5 0:0:0")),
            json!("2024-01-05 00:00:00")
        );
        assert_eq!(
            typed_value(&FieldType::Datetime, "2024-01-05 09:30:00"),
            json!("2024-01-05 09:30:00")
        );
        assert_eq!(
            bind_text(&FieldType::Datetime, &json!("2024-12-5 7:5:3")),
            Some("2024-12-05 07:05:03".into())
        );
    }

    #[test]
    fn normalizes_for_storage() {
        assert_eq!(normalize(&FieldType::Int, &json!("15")), json!(15));
        assert_eq!(normalize(&FieldType::Bool, &json!(0)), json!(false));
        assert_eq!(normalize(&FieldType::String, &json!(12)), json!("12"));
        assert_eq!(typed_value(&FieldType::BigInt, "7"), json!(7));
        assert_eq!(bind_text(&FieldType::Bool, &json!(1)), Some("true".into()));
        assert_eq!(bind_text(&FieldType::Text, &Value::Null), None);
    }
}
