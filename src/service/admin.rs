//! Admin operations: validate, execute against the store, classify the outcome.

use crate::config::ResolvedTable;
use crate::error::AppError;
use crate::service::dependents::find_dependents;
use crate::service::validation::{RowValidator, WriteMode};
use crate::store::Store;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Default page size for listings.
pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

/// Successful write: what happened to which row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub table: String,
    pub action: Action,
    pub id: i64,
}

impl WriteOutcome {
    /// One-line summary for display.
    pub fn summary(&self) -> String {
        let verb = match self.action {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        };
        format!("{}: {} id={}", verb, self.table, self.id)
    }
}

fn id_filter(table: &ResolvedTable, id: i64) -> [(String, Value); 1] {
    [(table.pk.clone(), Value::Number(id.into()))]
}

pub struct AdminService;

impl AdminService {
    pub async fn create(
        store: &Store,
        table: &ResolvedTable,
        fields: &HashMap<String, Value>,
    ) -> Result<WriteOutcome, AppError> {
        if fields.is_empty() {
            return Err(AppError::Validation("no data submitted".into()));
        }
        RowValidator::validate(store, table, fields, WriteMode::Insert).await?;
        let id = store.insert(table, fields).await?;
        tracing::info!(table = %table.name, id, "row created");
        Ok(WriteOutcome {
            table: table.name.clone(),
            action: Action::Created,
            id,
        })
    }

    /// List rows with exact-match filters, ordered by id.
    pub async fn list(
        store: &Store,
        table: &ResolvedTable,
        filters: &[(String, Value)],
        limit: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        store
            .select(table, None, filters, Some(limit.unwrap_or(DEFAULT_LIMIT)))
            .await
    }

    pub async fn read(store: &Store, table: &ResolvedTable, id: i64) -> Result<Option<Value>, AppError> {
        let rows = store.select(table, None, &id_filter(table, id), Some(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Partial update keyed by id; fields not submitted are left alone.
    pub async fn update(
        store: &Store,
        table: &ResolvedTable,
        id: i64,
        fields: &HashMap<String, Value>,
    ) -> Result<WriteOutcome, AppError> {
        if fields.is_empty() {
            return Err(AppError::Validation("no fields to update".into()));
        }
        RowValidator::validate(store, table, fields, WriteMode::Update { id }).await?;
        let changed = store.update(table, fields, &id_filter(table, id)).await?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("row id={} in {}", id, table.name)));
        }
        tracing::info!(table = %table.name, id, "row updated");
        Ok(WriteOutcome {
            table: table.name.clone(),
            action: Action::Updated,
            id,
        })
    }

    /// Delete by id. A foreign-key refusal is answered with the rows that still reference it.
    pub async fn delete(store: &Store, table: &ResolvedTable, id: i64) -> Result<WriteOutcome, AppError> {
        match store.delete(table, &id_filter(table, id)).await {
            Ok(0) => Err(AppError::NotFound(format!("row id={} in {}", id, table.name))),
            Ok(_) => {
                tracing::info!(table = %table.name, id, "row deleted");
                Ok(WriteOutcome {
                    table: table.name.clone(),
                    action: Action::Deleted,
                    id,
                })
            }
            Err(AppError::ForeignKey { message, .. }) => {
                let dependents = find_dependents(store, &table.name, id).await.unwrap_or_else(|e| {
                    tracing::warn!(table = %table.name, id, error = %e, "dependents scan failed");
                    Default::default()
                });
                Err(AppError::ForeignKey { message, dependents })
            }
            Err(e) => Err(e),
        }
    }
}
