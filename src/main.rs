//! Server: loads settings and the table registry, creates missing tables, serves the admin API.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use transit_admin::{app, load_registry, AppState, Settings, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("transit_admin=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env();
    let registry = load_registry(settings.schema_path.as_deref()).await.map_err(|e| {
        tracing::error!(code = e.code(), error = %e, "table registry rejected");
        e
    })?;

    let store = Store::open(&settings.database_path);
    store.ensure_schema(&registry).await?;
    tracing::info!(
        database = %settings.database_path.display(),
        tables = registry.tables().len(),
        "store ready"
    );

    let state = AppState {
        store,
        registry: Arc::new(registry),
    };

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
