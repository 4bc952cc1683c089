//! Row validation from registry metadata: required, typed formats, uniqueness.

use crate::config::{FieldKind, ResolvedTable};
use crate::error::AppError;
use crate::store::Store;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

lazy_static! {
    static ref RUT: Regex = Regex::new(r"^\d{1,2}\.\d{3}\.\d{3}-[\dkK]$").unwrap();
    static ref DATE: Regex = Regex::new(r"^\d{4}/\d{2}/\d{2}$").unwrap();
    static ref DATE_TIME: Regex = Regex::new(r"^\d{4}/\d{2}/\d{2}\s+\d{2}:\d{2}$").unwrap();
    static ref TIME: Regex = Regex::new(r"^\d{2}:\d{2}$").unwrap();
}

/// Whether a row is being created or an existing row (by id) is being changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Update { id: i64 },
}

pub struct RowValidator;

impl RowValidator {
    /// Full check, stopping at the first failure: required, formats, then uniqueness against the store.
    pub async fn validate(
        store: &Store,
        table: &ResolvedTable,
        fields: &HashMap<String, Value>,
        mode: WriteMode,
    ) -> Result<(), AppError> {
        Self::check_fields(table, fields, mode)?;
        Self::check_unique(store, table, fields, mode).await
    }

    /// Checks that need no store access. On update, absent required fields are skipped.
    pub fn check_fields(
        table: &ResolvedTable,
        fields: &HashMap<String, Value>,
        mode: WriteMode,
    ) -> Result<(), AppError> {
        for col in table.required() {
            let val = fields.get(&col.name);
            if matches!(mode, WriteMode::Update { .. }) && val.is_none() {
                continue;
            }
            if val.map_or(true, is_blank) {
                return Err(AppError::Validation(format!(
                    "field '{}' is required for table {}",
                    col.name, table.name
                )));
            }
        }

        for (col, kind) in table.typed() {
            let Some(v) = fields.get(&col.name).filter(|v| !v.is_null()) else {
                continue;
            };
            check_format(&col.name, &value_text(v), kind)?;
        }
        Ok(())
    }

    /// Any existing row holding a unique value is a conflict, except the row being updated.
    pub async fn check_unique(
        store: &Store,
        table: &ResolvedTable,
        fields: &HashMap<String, Value>,
        mode: WriteMode,
    ) -> Result<(), AppError> {
        for col in table.unique() {
            let Some(v) = fields.get(&col.name).filter(|v| !is_blank(v)) else {
                continue;
            };
            let columns = [table.pk.as_str(), col.name.as_str()];
            let rows = store
                .select(table, Some(&columns[..]), &[(col.name.clone(), v.clone())], None)
                .await?;
            let clash = rows.iter().any(|row| match mode {
                WriteMode::Insert => true,
                WriteMode::Update { id } => row.get(&table.pk).and_then(Value::as_i64) != Some(id),
            });
            if clash {
                return Err(AppError::Conflict(format!(
                    "value '{}' for '{}' already exists in {}",
                    value_text(v),
                    col.name,
                    table.name
                )));
            }
        }
        Ok(())
    }
}

/// Surface-format check for a typed field.
pub fn check_format(field: &str, s: &str, kind: FieldKind) -> Result<(), AppError> {
    match kind {
        FieldKind::Rut => {
            if !RUT.is_match(s) {
                return Err(AppError::Validation(format!(
                    "field '{}' must use RUT format xx.xxx.xxx-x",
                    field
                )));
            }
        }
        FieldKind::Datetime => {
            let s = s.trim();
            if !(DATE.is_match(s) || DATE_TIME.is_match(s)) {
                return Err(AppError::Validation(format!(
                    "field '{}' must use date format 'YYYY/MM/DD' or 'YYYY/MM/DD HH:MM'",
                    field
                )));
            }
            if let Some((_, time)) = s.split_once(' ') {
                if !TIME.is_match(time) {
                    return Err(AppError::Validation(format!(
                        "field '{}' has an invalid time, use 'HH:MM'",
                        field
                    )));
                }
            }
        }
    }
    Ok(())
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn value_text(v: &Value) -> Cow<'_, str> {
    match v {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}
