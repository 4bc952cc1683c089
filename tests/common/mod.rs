#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use transit_admin::{app, builtin_schema, resolve, AppState, SchemaRegistry, Store};

/// Router over a fresh SQLite file with every registry table created.
/// Keep the value alive for the whole test: dropping it removes the file.
pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub registry: Arc<SchemaRegistry>,
    _dir: TempDir,
}

pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("transportes.db"));
    let registry = resolve(&builtin_schema().unwrap()).unwrap();
    store.ensure_schema(&registry).await.unwrap();
    let registry = Arc::new(registry);
    let state = AppState {
        store: store.clone(),
        registry: registry.clone(),
    };
    TestApp {
        router: app(state),
        store,
        registry,
        _dir: dir,
    }
}

fn encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn fields(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

async fn send(app: &TestApp, method: Method, uri: &str, form: Option<&[(&str, &str)]>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match form {
        Some(pairs) => {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form_body(pairs))
        }
        None => Body::empty(),
    };
    let response = app.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post_form(app: &TestApp, uri: &str, pairs: &[(&str, &str)]) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(pairs)).await
}

pub async fn patch_form(app: &TestApp, uri: &str, pairs: &[(&str, &str)]) -> (StatusCode, Value) {
    send(app, Method::PATCH, uri, Some(pairs)).await
}

pub async fn delete(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

/// Created row id from a write response.
pub fn created_id(json: &Value) -> i64 {
    json["data"]["id"].as_i64().unwrap()
}
