//! Compiles `field[__operator]=value` query parameters into AND-combined clauses.

use crate::config::ResponseMessages;
use crate::error::ValidationError;
use crate::schema::ModelSchema;
use crate::service::coerce::check_raw_in_range;

/// Separates the field name from the operator token in a query key.
pub const OPERATOR_SEPARATOR: &str = "__";

/// Query keys consumed by the caller, never compiled into clauses.
pub const RESERVED_PARAMS: &[&str] = &["foreign_keys", "page"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Null,
    StartsWith,
    Contains,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
}

/// Supported operator tokens.
pub const OPERATORS: &[(&str, Operator)] = &[
    ("eq", Operator::Eq),
    ("null", Operator::Null),
    ("startswith", Operator::StartsWith),
    ("contains", Operator::Contains),
    ("lt", Operator::Lt),
    ("lte", Operator::Lte),
    ("gt", Operator::Gt),
    ("gte", Operator::Gte),
    ("in", Operator::In),
    ("notin", Operator::NotIn),
];

impl Operator {
    pub fn parse(token: &str) -> Option<Operator> {
        OPERATORS.iter().find(|(t, _)| *t == token).map(|(_, op)| *op)
    }

    pub fn token(&self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(t, _)| *t)
            .unwrap_or("eq")
    }

    /// `in`/`notin` always carry a list.
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

pub fn supported_tokens() -> Vec<&'static str> {
    OPERATORS.iter().map(|(t, _)| *t).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn items(&self) -> Vec<&str> {
        match self {
            FilterValue::Scalar(s) => vec![s.as_str()],
            FilterValue::List(v) => v.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_scalar(&self) -> &str {
        match self {
            FilterValue::Scalar(s) => s,
            FilterValue::List(v) => v.first().map(String::as_str).unwrap_or(""),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub operator: Operator,
    pub value: FilterValue,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        FilterClause {
            field: field.into(),
            operator,
            value,
        }
    }

    /// For `null` clauses: true means IS NULL, false means IS NOT NULL.
    pub fn wants_null(&self) -> bool {
        let v = self.value.as_scalar().trim();
        v == "1" || v.eq_ignore_ascii_case("true")
    }
}

/// Ordered clauses, all of which must hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    clauses: Vec<FilterClause>,
}

impl CompiledQuery {
    pub fn new() -> Self {
        CompiledQuery::default()
    }

    pub fn push(&mut self, clause: FilterClause) {
        self.clauses.push(clause);
    }

    /// Query matching `field = value`.
    pub fn field_eq(field: &str, value: impl Into<String>) -> Self {
        CompiledQuery {
            clauses: vec![FilterClause::new(field, Operator::Eq, FilterValue::Scalar(value.into()))],
        }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

/// Splits a query key into field name and optional operator token at the first separator.
pub fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.split_once(OPERATOR_SEPARATOR) {
        Some((field, op)) => (field, Some(op)),
        None => (key, None),
    }
}

/// Compile query parameters against a schema. Reserved keys are skipped.
pub fn compile(
    params: &[(String, String)],
    schema: &ModelSchema,
    messages: &ResponseMessages,
) -> Result<CompiledQuery, ValidationError> {
    let mut query = CompiledQuery::new();
    for (key, raw) in params {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        let (field_name, token) = split_key(key);
        let token = token.unwrap_or("eq");
        let operator = Operator::parse(token)
            .ok_or_else(|| messages.invalid_filter_option(token, supported_tokens().as_slice()))?;
        let field = schema
            .get(field_name)
            .ok_or_else(|| messages.invalid_field(key, schema.field_names().as_slice()))?;

        let value = if operator.takes_list() {
            FilterValue::List(raw.split(',').map(str::to_string).collect())
        } else {
            FilterValue::Scalar(raw.clone())
        };

        if operator != Operator::Null {
            for item in value.items() {
                check_raw_in_range(field, item, messages)?;
            }
        }

        query.push(FilterClause::new(field_name, operator, value));
    }
    tracing::debug!(model = schema.name(), clauses = ?query.clauses(), "compiled filter");
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::{FieldSchema, FieldType};

    fn schema() -> ModelSchema {
        ModelSchema::build(
            "widget",
            vec![
                FieldSchema::new("id", FieldType::PrimaryKey),
                FieldSchema::new("name", FieldType::String),
                FieldSchema::new("base_pay", FieldType::Int),
                FieldSchema::new("active", FieldType::Bool).nullable(true),
                FieldSchema::new("created", FieldType::Datetime).nullable(true),
            ],
        )
        .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn run(pairs: &[(&str, &str)]) -> Result<CompiledQuery, ValidationError> {
        compile(&params(pairs), &schema(), &ResponseMessages::default())
    }

    #[test]
    fn default_operator_is_eq() {
        let q = run(&[("name", "Widget")]).unwrap();
        assert_eq!(
            q.clauses(),
            &[FilterClause::new("name", Operator::Eq, FilterValue::Scalar("Widget".into()))]
        );
    }

    #[test]
    fn compiles_gte_and_skips_reserved_keys() {
        let q = run(&[("base_pay__gte", "10"), ("page", "2"), ("foreign_keys", "true")]).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(q.clauses()[0].field, "base_pay");
        assert_eq!(q.clauses()[0].operator, Operator::Gte);
        assert_eq!(q.clauses()[0].value, FilterValue::Scalar("10".into()));
    }

    #[test]
    fn every_operator_token_parses() {
        for (token, op) in OPERATORS {
            assert_eq!(Operator::parse(token), Some(*op));
            assert_eq!(op.token(), *token);
        }
    }

    #[test]
    fn unknown_operator_rejected() {
        let err = run(&[("name__foo", "x")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFilterOption);
        assert!(err.message.contains("foo"));
        assert!(err.message.contains("startswith"));
    }

    #[test]
    fn operator_is_checked_before_field() {
        let err = run(&[("nope__foo", "x")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFilterOption);
    }

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(split_key("base_pay__gte"), ("base_pay", Some("gte")));
        assert_eq!(split_key("name"), ("name", None));
        assert_eq!(split_key("a__b__c"), ("a", Some("b__c")));
        let err = run(&[("name__in__x", "a")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFilterOption);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = run(&[("salary__gt", "1")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidField);
        assert!(err.message.contains("salary__gt"));
    }

    #[test]
    fn in_values_are_lists() {
        let q = run(&[("base_pay__in", "1,2,3")]).unwrap();
        assert_eq!(
            q.clauses()[0].value,
            FilterValue::List(vec!["1".into(), "2".into(), "3".into()])
        );
        let q = run(&[("name__notin", "solo")]).unwrap();
        assert_eq!(q.clauses()[0].value, FilterValue::List(vec!["solo".into()]));
    }

    #[test]
    fn list_items_are_type_checked_individually() {
        let err = run(&[("base_pay__in", "1,two,3")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeInteger);
        assert!(err.message.contains("two"));
    }

    #[test]
    fn scalar_values_are_type_checked() {
        assert_eq!(run(&[("base_pay__lt", "x")]).unwrap_err().kind, ErrorKind::TypeInteger);
        assert_eq!(run(&[("active", "yes")]).unwrap_err().kind, ErrorKind::TypeBoolean);
        assert_eq!(run(&[("created__gt", "2024")]).unwrap_err().kind, ErrorKind::TypeDatetime);
        assert!(run(&[("created__gt", "2024-01-01 00:00:00")]).is_ok());
        assert_eq!(run(&[("id", "abc")]).unwrap_err().kind, ErrorKind::TypeInteger);
    }

    #[test]
    fn integer_filters_are_range_checked() {
        let err = run(&[("base_pay__gt", "99999999999")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FieldOutOfRange);
        assert!(err.message.contains("base_pay"));
        assert_eq!(
            run(&[("base_pay__in", "1,2147483648")]).unwrap_err().kind,
            ErrorKind::FieldOutOfRange
        );
        assert!(run(&[("base_pay__lte", "-2147483647")]).is_ok());
        assert_eq!(
            run(&[("id", "99999999999999999999")]).unwrap_err().kind,
            ErrorKind::FieldOutOfRange
        );
    }

    #[test]
    fn null_operator_skips_type_check() {
        let q = run(&[("base_pay__null", "true")]).unwrap();
        assert!(q.clauses()[0].wants_null());
        let q = run(&[("base_pay__null", "0")]).unwrap();
        assert!(!q.clauses()[0].wants_null());
    }

    #[test]
    fn clauses_keep_parameter_order() {
        let q = run(&[("name__startswith", "W"), ("base_pay__lte", "20"), ("name__contains", "dg")]).unwrap();
        let ops: Vec<Operator> = q.clauses().iter().map(|c| c.operator).collect();
        assert_eq!(ops, vec![Operator::StartsWith, Operator::Lte, Operator::Contains]);
    }
}
