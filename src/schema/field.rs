//! One field of one entity.

use std::fmt;

/// Maximum length applied to `string` fields that do not declare one.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// Logical storage type of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Int,
    BigInt,
    Bool,
    String,
    Text,
    Datetime,
    /// Integer key assigned by the store.
    PrimaryKey,
    /// Integer reference to the primary key of another resource.
    ForeignKey { references: String },
}

impl FieldType {
    /// Parses a type token from a model definition. `references` is only
    /// consulted for `foreign_key`.
    pub fn parse(token: &str, references: Option<&str>) -> Option<FieldType> {
        Some(match token.to_lowercase().as_str() {
            "int" | "integer" => FieldType::Int,
            "bigint" => FieldType::BigInt,
            "bool" | "boolean" => FieldType::Bool,
            "string" | "varchar" => FieldType::String,
            "text" => FieldType::Text,
            "datetime" => FieldType::Datetime,
            "primary_key" => FieldType::PrimaryKey,
            "foreign_key" => FieldType::ForeignKey {
                references: references?.to_string(),
            },
            _ => return None,
        })
    }

    /// Token reported in the metadata listing.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::BigInt => "bigint",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Datetime => "datetime",
            FieldType::PrimaryKey => "primary_key",
            FieldType::ForeignKey { .. } => "foreign_key",
        }
    }

    /// Inclusive bounds enforced on integer values.
    pub fn int_range(&self) -> Option<(i128, i128)> {
        match self {
            FieldType::Int | FieldType::ForeignKey { .. } => Some((-2_147_483_647, 2_147_483_647)),
            FieldType::BigInt | FieldType::PrimaryKey => Some((i64::MIN as i128, i64::MAX as i128)),
            _ => None,
        }
    }

    /// PostgreSQL type used to cast text-bound parameters.
    pub fn pg_cast(&self) -> &'static str {
        match self {
            FieldType::Int => "integer",
            FieldType::BigInt | FieldType::PrimaryKey | FieldType::ForeignKey { .. } => "bigint",
            FieldType::Bool => "boolean",
            FieldType::String | FieldType::Text => "text",
            FieldType::Datetime => "timestamp",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable description of a single field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub max_length: Option<u32>,
    /// Name under which referencing rows are embedded on the target resource.
    pub related_name: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let max_length = match field_type {
            FieldType::String => Some(DEFAULT_STRING_LENGTH),
            _ => None,
        };
        FieldSchema {
            name: name.into(),
            field_type,
            nullable: false,
            max_length,
            related_name: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.field_type == FieldType::PrimaryKey
    }

    pub fn references(&self) -> Option<&str> {
        match &self.field_type {
            FieldType::ForeignKey { references } => Some(references),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tokens() {
        assert_eq!(FieldType::parse("int", None), Some(FieldType::Int));
        assert_eq!(FieldType::parse("BIGINT", None), Some(FieldType::BigInt));
        assert_eq!(
            FieldType::parse("foreign_key", Some("job")),
            Some(FieldType::ForeignKey { references: "job".into() })
        );
        assert_eq!(FieldType::parse("foreign_key", None), None);
        assert_eq!(FieldType::parse("decimal", None), None);
    }

    #[test]
    fn string_fields_default_to_255() {
        assert_eq!(FieldSchema::new("name", FieldType::String).max_length, Some(255));
        assert_eq!(FieldSchema::new("bio", FieldType::Text).max_length, None);
        assert_eq!(FieldSchema::new("name", FieldType::String).max_length(40).max_length, Some(40));
    }

    #[test]
    fn int_bounds() {
        assert_eq!(FieldType::Int.int_range(), Some((-2147483647, 2147483647)));
        assert_eq!(
            FieldType::BigInt.int_range(),
            Some((-9223372036854775808, 9223372036854775807))
        );
        assert_eq!(FieldType::PrimaryKey.int_range(), FieldType::BigInt.int_range());
        assert_eq!(FieldType::String.int_range(), None);
    }
}
