//! Typed errors and HTTP mapping.

use crate::response::Envelope;
use axum::{
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Raised while building the registry. Fatal at startup, never per request.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("model '{model}' has no primary key field")]
    MissingPrimaryKey { model: String },
    #[error("model '{model}' declares more than one primary key: {}", fields.join(", "))]
    MultiplePrimaryKeys { model: String, fields: Vec<String> },
    #[error("model '{model}' declares field '{field}' more than once")]
    DuplicateField { model: String, field: String },
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),
    #[error("duplicate route: {0}")]
    DuplicateRoute(String),
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("model '{model}' field '{field}' has unknown type '{type_name}'")]
    UnknownFieldType {
        model: String,
        field: String,
        type_name: String,
    },
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("config load: {0}")]
    Load(String),
}

/// Category of a rejected request. Every kind maps to HTTP 400.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidJson,
    InvalidField,
    InvalidFilterOption,
    TypeInteger,
    TypeBoolean,
    TypeDatetime,
    PrimaryKeyUpdateInsert,
    NonNullableFieldInsert,
    FieldOutOfRange,
}

/// Terminal result of a failed validation or filter-compilation stage.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ValidationError {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("{0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Body could not be read, e.g. it exceeds the configured limit.
    #[error(transparent)]
    Body(#[from] BytesRejection),
    #[error(transparent)]
    Query(#[from] QueryRejection),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Body(rejection) => rejection.status(),
            AppError::Query(rejection) => rejection.status(),
            AppError::Store(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Validation(e) => tracing::debug!(kind = ?e.kind, message = %e.message, "request rejected"),
            AppError::Body(e) => tracing::debug!(status = %status, error = %e, "request body rejected"),
            AppError::Query(e) => tracing::debug!(status = %status, error = %e, "query string rejected"),
            other => tracing::error!(error = %other, "request failed"),
        }
        Envelope::new(serde_json::Value::Null, status, self.to_string()).into_response()
    }
}
