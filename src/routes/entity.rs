//! Entity CRUD routes built from the registry.
//! Every resource gets its own collection and item routes; handlers are closures over the resource name.

use crate::handlers;
use crate::service::WriteMethod;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::{BytesRejection, QueryRejection}, DefaultBodyLimit, Path, Query, State},
    http::Method,
    routing::get,
    Router,
};
use std::sync::Arc;

pub fn entity_routes(state: AppState) -> Router {
    let mut router = Router::new();
    for entry in state.registry.entries() {
        let name: Arc<str> = Arc::from(entry.name.as_str());
        let collection = entry.route_url.clone();
        let item = format!("{}/:pk", entry.route_url);

        let list = {
            let name = name.clone();
            move |State(state): State<AppState>, params: Result<Query<Vec<(String, String)>>, QueryRejection>| {
                let name = name.clone();
                async move { handlers::list(state, &name, params.map(|Query(p)| p)).await }
            }
        };
        let create = {
            let name = name.clone();
            move |State(state): State<AppState>, body: Result<Bytes, BytesRejection>| {
                let name = name.clone();
                async move { handlers::create(state, &name, body).await }
            }
        };
        let read = {
            let name = name.clone();
            move |State(state): State<AppState>, Path(pk): Path<String>| {
                let name = name.clone();
                async move { handlers::read(state, &name, pk).await }
            }
        };
        let update = {
            let name = name.clone();
            move |State(state): State<AppState>,
                  Path(pk): Path<String>,
                  method: Method,
                  body: Result<Bytes, BytesRejection>| {
                let name = name.clone();
                let method = WriteMethod::from_http(&method).unwrap_or(WriteMethod::Update);
                async move { handlers::update(state, &name, pk, method, body).await }
            }
        };
        let delete = {
            let name = name.clone();
            move |State(state): State<AppState>, Path(pk): Path<String>| {
                let name = name.clone();
                async move { handlers::delete(state, &name, pk).await }
            }
        };

        router = router
            .route(&collection, get(list).post(create).fallback(handlers::method_not_allowed))
            .route(
                &item,
                get(read)
                    .put(update.clone())
                    .patch(update)
                    .delete(delete)
                    .fallback(handlers::method_not_allowed),
            );
    }

    router
        .route("/", get(handlers::index).fallback(handlers::method_not_allowed))
        .fallback(handlers::route_not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .with_state(state)
}
