//! Demo server: loads model definitions from `MODELS_PATH`, connects to `DATABASE_URL`, mounts CRUD routes.

use schema_crud::{entity_routes, load_registry_from_dir, AppState, PgDatabase, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("schema_crud=info")),
        )
        .init();

    let settings = Settings::from_env();
    let registry = load_registry_from_dir(&settings.models_path).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    let state = AppState::new(Arc::new(PgDatabase::new(pool)), registry);
    let app = axum::Router::new().nest("/api/v1", entity_routes(state, settings.max_body_bytes));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
