//! Entity CRUD handlers: list, read, create, update, delete.
//! Each takes the resource name its route was registered for.

use crate::config::messages::{display_value, render};
use crate::config::{ResourceEntry, ResponseMessages};
use crate::error::{AppError, ValidationError};
use crate::query::compile;
use crate::response::{not_found, parse_page, success_ok, Envelope};
use crate::service::coerce::{check_raw_in_range, typed_value};
use crate::service::{CrudService, RequestValidator, WriteMethod};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use serde_json::Value;

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn parse_pk(entry: &ResourceEntry, raw: &str, messages: &ResponseMessages) -> Result<Value, ValidationError> {
    let field = entry.schema.primary_key_field();
    check_raw_in_range(field, raw, messages)?;
    Ok(typed_value(&field.field_type, raw))
}

fn pk_text(entry: &ResourceEntry, row: &Value) -> String {
    display_value(&row[entry.schema.primary_key()])
}

pub async fn list(
    state: AppState,
    resource: &str,
    params: Result<Vec<(String, String)>, QueryRejection>,
) -> Result<Envelope, AppError> {
    let entry = state.entry(resource)?;
    let params = params?;
    let messages = &state.config.messages;
    let query = compile(&params, &entry.schema, messages)?;
    let page = parse_page(param(&params, "page"), messages)?;
    let include_related = param(&params, "foreign_keys")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let (rows, pagination) =
        CrudService::list(state.store.as_ref(), &state.registry, entry, &query, page, include_related).await?;
    Ok(success_ok(Value::Array(rows), messages.ok.clone()).with_page(pagination.page, pagination.total_pages))
}

pub async fn read(state: AppState, resource: &str, pk: String) -> Result<Envelope, AppError> {
    let entry = state.entry(resource)?;
    let messages = &state.config.messages;
    let pk = parse_pk(entry, &pk, messages)?;
    Ok(match CrudService::read(state.store.as_ref(), entry, &pk).await? {
        Some(row) => success_ok(row, messages.ok.clone()),
        None => not_found(messages),
    })
}

pub async fn create(
    state: AppState,
    resource: &str,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope, AppError> {
    let entry = state.entry(resource)?;
    let body = body?;
    let messages = &state.config.messages;
    let payload = RequestValidator::parse(&body, messages)?;
    let payload = RequestValidator::validate(WriteMethod::Create, &payload, &entry.schema, messages)?;
    let row = CrudService::create(state.store.as_ref(), entry, &payload).await?;
    let message = render(&messages.row_created, &[&pk_text(entry, &row)]);
    Ok(success_ok(row, message))
}

pub async fn update(
    state: AppState,
    resource: &str,
    pk: String,
    method: WriteMethod,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope, AppError> {
    let entry = state.entry(resource)?;
    let body = body?;
    let messages = &state.config.messages;
    let pk = parse_pk(entry, &pk, messages)?;
    let payload = RequestValidator::parse(&body, messages)?;
    let payload = RequestValidator::validate(method, &payload, &entry.schema, messages)?;
    Ok(match CrudService::update(state.store.as_ref(), entry, &pk, &payload).await? {
        Some(row) => {
            let message = render(&messages.row_updated, &[&pk_text(entry, &row)]);
            success_ok(row, message)
        }
        None => not_found(messages),
    })
}

pub async fn delete(state: AppState, resource: &str, pk: String) -> Result<Envelope, AppError> {
    let entry = state.entry(resource)?;
    let messages = &state.config.messages;
    let pk = parse_pk(entry, &pk, messages)?;
    Ok(match CrudService::delete(state.store.as_ref(), entry, &pk).await? {
        Some(row) => {
            let message = render(&messages.row_deleted, &[&pk_text(entry, &row)]);
            success_ok(row, message)
        }
        None => not_found(messages),
    })
}
