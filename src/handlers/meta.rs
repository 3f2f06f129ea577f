//! `GET /`: every registered resource with its route and fields.

use crate::response::{success_ok, Envelope};
use crate::state::AppState;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
struct FieldMeta<'a> {
    field_name: &'a str,
    field_type: &'static str,
    is_required: bool,
}

#[derive(Serialize)]
struct ResourceMeta<'a> {
    route_url: &'a str,
    fields: Vec<FieldMeta<'a>>,
}

pub fn describe(state: &AppState) -> Value {
    let mut routes = Map::new();
    for entry in state.registry.entries() {
        let fields = entry
            .schema
            .fields()
            .iter()
            .map(|f| FieldMeta {
                field_name: &f.name,
                field_type: f.field_type.name(),
                is_required: f.is_primary_key() || entry.schema.is_required(&f.name),
            })
            .collect();
        let meta = ResourceMeta {
            route_url: &entry.route_url,
            fields,
        };
        routes.insert(
            entry.name.clone(),
            serde_json::to_value(meta).unwrap_or(Value::Null),
        );
    }
    serde_json::json!({ "routes": routes })
}

pub async fn index(State(state): State<AppState>) -> Envelope {
    success_ok(describe(&state), state.config.messages.ok.clone())
}
