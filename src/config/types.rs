//! Raw registry types matching the JSON table registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Special surface format a column must follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Chilean national id, e.g. `12.345.678-9`.
    Rut,
    /// `YYYY/MM/DD` or `YYYY/MM/DD HH:MM`.
    Datetime,
}

/// SQLite column affinity used when creating tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Integer,
    Real,
    #[default]
    Text,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyConfig {
    pub table: String,
    #[serde(default = "default_pk_column")]
    pub column: String,
}

pub(crate) fn default_pk_column() -> String {
    "id".into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub sql_type: SqlType,
    #[serde(default)]
    pub references: Option<ForeignKeyConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    /// Editable columns; the `id` primary key is implicit.
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub unique: Vec<String>,
    #[serde(default)]
    pub types: BTreeMap<String, FieldKind>,
}

/// Whole registry as loaded from JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub tables: Vec<TableConfig>,
}
