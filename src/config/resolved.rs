//! Resolved registry: config validated and flattened for runtime use.

use crate::config::{FieldKind, ForeignKeyConfig, SqlType};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedColumn {
    pub name: String,
    pub sql_type: SqlType,
    pub required: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKeyConfig>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedTable {
    pub name: String,
    /// Auto-increment primary key column (always `id`).
    pub pk: String,
    /// Editable columns in declaration order.
    pub columns: Vec<ResolvedColumn>,
}

impl ResolvedTable {
    pub fn column(&self, name: &str) -> Option<&ResolvedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True for the primary key and every editable column.
    pub fn has_column(&self, name: &str) -> bool {
        name == self.pk || self.column(name).is_some()
    }

    /// `id` followed by the editable columns.
    pub fn select_columns(&self) -> Vec<&str> {
        std::iter::once(self.pk.as_str())
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .collect()
    }

    pub fn required(&self) -> impl Iterator<Item = &ResolvedColumn> {
        self.columns.iter().filter(|c| c.required)
    }

    pub fn unique(&self) -> impl Iterator<Item = &ResolvedColumn> {
        self.columns.iter().filter(|c| c.unique)
    }

    pub fn typed(&self) -> impl Iterator<Item = (&ResolvedColumn, FieldKind)> {
        self.columns.iter().filter_map(|c| c.kind.map(|k| (c, k)))
    }
}

/// Immutable table registry, built once at start and shared behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    tables: Vec<ResolvedTable>,
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub(crate) fn new(tables: Vec<ResolvedTable>) -> Self {
        let by_name = tables.iter().enumerate().map(|(i, t)| (t.name.clone(), i)).collect();
        SchemaRegistry { tables, by_name }
    }

    pub fn table(&self, name: &str) -> Option<&ResolvedTable> {
        self.by_name.get(name).map(|&i| &self.tables[i])
    }

    pub fn tables(&self) -> &[ResolvedTable] {
        &self.tables
    }
}
