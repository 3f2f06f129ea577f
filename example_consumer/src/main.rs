//! Example consumer: serves CRUD endpoints for the models in `MODELS_PATH`.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! With `DATABASE_URL` set, rows live in PostgreSQL (tables must already exist);
//! otherwise an in-memory store seeded with one job and one person is used.

use crud_engine::{app, load_definitions, resolve, AppState, CrudConfig, MemoryStore, Persistence, PgStore, Registry};
use serde_json::json;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("crud_engine=info,example_consumer=info")),
        )
        .init();

    let models_path = std::env::var("MODELS_PATH").unwrap_or_else(|_| "example_consumer/models.json".into());
    let definitions = load_definitions(&models_path).await?;
    let config = CrudConfig::from_env();
    let registry = resolve(&definitions, &config)?;

    let state = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            AppState::new(PgStore::new(pool), registry, config)
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            let store = MemoryStore::new();
            seed(&store, &registry).await?;
            AppState::new(store, registry, config)
        }
    };

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into());
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn seed(store: &MemoryStore, registry: &Registry) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(job), Some(person)) = (registry.get("job"), registry.get("person")) else {
        return Ok(());
    };
    let job_row = json!({"name": "Space garbage man", "description": "Collects garbage in space", "base_pay": 15});
    let person_row = json!({"name": "Sanic the Hedgehog", "email": "gottagofeast@fast.com", "job": 1});
    if let (Some(j), Some(p)) = (job_row.as_object(), person_row.as_object()) {
        store.create(job, j).await?;
        store.create(person, p).await?;
    }
    Ok(())
}
