//! Registry exposure so form clients can render fields and pre-validate.

use crate::response::success_many;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

/// GET /schema: every table with its columns, required/unique flags and typed fields.
pub async fn get_schema(State(state): State<AppState>) -> impl IntoResponse {
    success_many(state.registry.tables().to_vec())
}
