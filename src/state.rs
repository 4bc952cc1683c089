//! Shared application state for all routes. The registry is immutable after start.

use crate::config::SchemaRegistry;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub registry: Arc<SchemaRegistry>,
}
