//! Table CRUD routes. Handlers resolve the table by path segment against the registry.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::handlers::schema::get_schema;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/schema", get(get_schema))
        .route("/:table", get(list).post(create))
        .route("/:table/:id", get(read).patch(update).delete(delete_handler))
        .with_state(state)
}
