//! Envelopes for requests no resource route answers.

use crate::response::Envelope;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};
use serde_json::Value;

pub async fn route_not_found(State(state): State<AppState>) -> Envelope {
    Envelope::new(Value::Null, StatusCode::NOT_FOUND, state.config.messages.route_not_found.clone())
}

pub async fn method_not_allowed(State(state): State<AppState>) -> Envelope {
    Envelope::new(
        Value::Null,
        StatusCode::METHOD_NOT_ALLOWED,
        state.config.messages.method_not_allowed.clone(),
    )
}
