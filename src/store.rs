//! SQLite data access: insert, select, update, delete.
//!
//! Every call opens its own connection with foreign-key enforcement on, runs one
//! parameterized statement and closes the connection whatever the outcome.

use crate::config::{ResolvedTable, SchemaRegistry};
use crate::error::{AppError, Dependents};
use crate::sql::{self, BindValue, QueryBuf};
use serde_json::Value;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Sqlite};
use std::collections::HashMap;
use std::path::Path;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

#[derive(Clone, Debug)]
pub struct Store {
    options: SqliteConnectOptions,
}

impl Store {
    /// File-backed store; the file is created on first connect.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        Store { options }
    }

    pub(crate) async fn connect(&self) -> Result<SqliteConnection, AppError> {
        self.options.connect().await.map_err(|e| {
            tracing::warn!(error = %e, "could not open store");
            AppError::Unavailable(e.to_string())
        })
    }

    /// Insert one row; returns the new row id.
    pub async fn insert(&self, table: &ResolvedTable, fields: &HashMap<String, Value>) -> Result<i64, AppError> {
        let q = sql::insert(table, fields);
        let mut conn = self.connect().await?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "insert");
        let result = bind_all(&q).execute(&mut conn).await;
        close(conn).await;
        let done = result.map_err(|e| classify(&table.name, e))?;
        Ok(done.last_insert_rowid())
    }

    /// Rows as JSON objects. `None` columns selects `id` plus the editable columns.
    pub async fn select(
        &self,
        table: &ResolvedTable,
        columns: Option<&[&str]>,
        filters: &[(String, Value)],
        limit: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        let q = sql::select(table, columns, filters, limit);
        let mut conn = self.connect().await?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "select");
        let result = bind_all(&q).fetch_all(&mut conn).await;
        close(conn).await;
        let rows = result.map_err(|e| classify(&table.name, e))?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Update matching rows; returns the number of rows changed.
    pub async fn update(
        &self,
        table: &ResolvedTable,
        fields: &HashMap<String, Value>,
        filters: &[(String, Value)],
    ) -> Result<u64, AppError> {
        let q = sql::update(table, fields, filters)?;
        self.execute(&table.name, &q).await
    }

    /// Delete matching rows; returns the number of rows removed.
    pub async fn delete(&self, table: &ResolvedTable, filters: &[(String, Value)]) -> Result<u64, AppError> {
        let q = sql::delete(table, filters)?;
        self.execute(&table.name, &q).await
    }

    async fn execute(&self, table: &str, q: &QueryBuf) -> Result<u64, AppError> {
        let mut conn = self.connect().await?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let result = bind_all(q).execute(&mut conn).await;
        close(conn).await;
        let done = result.map_err(|e| classify(table, e))?;
        Ok(done.rows_affected())
    }

    /// Create every registry table that does not exist yet.
    pub async fn ensure_schema(&self, registry: &SchemaRegistry) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let mut outcome = Ok(());
        for table in registry.tables() {
            let ddl = sql::create_table(table);
            tracing::debug!(sql = %ddl, "ensure table");
            if let Err(e) = sqlx::query(&ddl).execute(&mut conn).await {
                outcome = Err(AppError::Db(e));
                break;
            }
        }
        close(conn).await;
        outcome
    }

    /// Cheap round trip used by the readiness probe.
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("SELECT 1").execute(&mut conn).await;
        close(conn).await;
        result.map(|_| ()).map_err(AppError::Db)
    }
}

fn bind_all(q: &QueryBuf) -> SqliteQuery<'_> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(BindValue::from_json(p));
    }
    query
}

pub(crate) async fn close(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "closing store connection");
    }
}

/// Reclassify integrity violations reported by SQLite into the error taxonomy.
pub(crate) fn classify(table: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        let message = db.message().to_string();
        let kind = match db.kind() {
            ErrorKind::Other if message.contains("FOREIGN KEY constraint failed") => ErrorKind::ForeignKeyViolation,
            ErrorKind::Other if message.contains("UNIQUE constraint failed") => ErrorKind::UniqueViolation,
            ErrorKind::Other if message.contains("NOT NULL constraint failed") => ErrorKind::NotNullViolation,
            k => k,
        };
        let classified = match kind {
            ErrorKind::UniqueViolation => Some(AppError::Conflict(format!("{} in {}", message, table))),
            ErrorKind::ForeignKeyViolation => Some(AppError::ForeignKey {
                message: format!("{} in {}", message, table),
                dependents: Dependents::new(),
            }),
            ErrorKind::NotNullViolation => Some(AppError::Validation(message.clone())),
            _ => None,
        };
        if let Some(e) = classified {
            tracing::warn!(table, error = %message, code = e.code(), "integrity violation");
            return e;
        }
    }
    tracing::warn!(table, error = %err, "database error");
    AppError::Db(err)
}

pub(crate) fn row_to_json(row: &SqliteRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, col.ordinal()));
    }
    Value::Object(map)
}

fn cell_to_value(row: &SqliteRow, idx: usize) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(idx) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(idx) {
        return Value::String(s);
    }
    Value::Null
}
