//! Transit admin: registry-driven CRUD over a SQLite transport-ticketing database.

pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{builtin_schema, load_from_path, load_registry, resolve, SchemaConfig, SchemaRegistry, Settings};
pub use error::{AppError, ConfigError, Dependents};
pub use routes::{common_routes, entity_routes};
pub use service::{AdminService, WriteOutcome};
pub use state::AppState;
pub use store::Store;

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Form bodies are small; anything larger is refused before parsing.
const BODY_LIMIT: usize = 64 * 1024;

/// Full router: common routes at the root, table routes under `/api/v1`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", entity_routes(state))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}
