//! Table CRUD handlers: list, create, read, update, delete.

use crate::config::ResolvedTable;
use crate::error::AppError;
use crate::form::{collect_fields, collect_filters};
use crate::response::{success_many, SuccessOne};
use crate::service::{AdminService, WriteOutcome};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use std::collections::HashMap;

fn table<'a>(state: &'a AppState, name: &str) -> Result<&'a ResolvedTable, AppError> {
    state
        .registry
        .table(name)
        .ok_or_else(|| AppError::NotFound(format!("table {}", name)))
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    match id_str.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::BadRequest(format!("invalid id '{}'", id_str))),
    }
}

fn written(status: StatusCode, outcome: WriteOutcome) -> impl IntoResponse {
    let meta = serde_json::json!({ "message": outcome.summary() });
    (status, Json(SuccessOne { data: outcome, meta: Some(meta) }))
}

pub async fn list(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &table_name)?;
    let limit = match params.get("limit") {
        Some(s) => Some(
            s.parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::BadRequest(format!("invalid limit '{}'", s)))?,
        ),
        None => None,
    };
    let filters = collect_filters(table, &params);
    let rows = AdminService::list(&state.store, table, &filters, limit).await?;
    Ok(success_many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &table_name)?;
    let fields = collect_fields(table, &form);
    let outcome = AdminService::create(&state.store, table, &fields).await?;
    Ok(written(StatusCode::CREATED, outcome))
}

pub async fn read(
    State(state): State<AppState>,
    Path((table_name, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &table_name)?;
    let id = parse_id(&id_str)?;
    let row = AdminService::read(&state.store, table, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("row id={} in {}", id, table.name)))?;
    Ok((StatusCode::OK, Json(SuccessOne { data: row, meta: None })))
}

pub async fn update(
    State(state): State<AppState>,
    Path((table_name, id_str)): Path<(String, String)>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &table_name)?;
    let id = parse_id(&id_str)?;
    let fields = collect_fields(table, &form);
    let outcome = AdminService::update(&state.store, table, id, &fields).await?;
    Ok(written(StatusCode::OK, outcome))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((table_name, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let table = table(&state, &table_name)?;
    let id = parse_id(&id_str)?;
    let outcome = AdminService::delete(&state.store, table, id).await?;
    Ok(written(StatusCode::OK, outcome))
}
