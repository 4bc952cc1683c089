//! Finds rows in other tables that still reference a row whose delete was refused.

use crate::error::{AppError, Dependents};
use crate::sql;
use crate::store::{close, row_to_json, Store};
use sqlx::sqlite::SqliteConnection;
use serde_json::Value;
use sqlx::Row;

/// Rows listed per referencing table.
pub const DEPENDENTS_LIMIT: u32 = 10;

/// Scan every user table's foreign keys for ones pointing at `table` and collect up to
/// [`DEPENDENTS_LIMIT`] referencing rows per table. Tables that fail to scan are skipped.
pub async fn find_dependents(store: &Store, table: &str, id: i64) -> Result<Dependents, AppError> {
    let mut conn = store.connect().await?;
    let result = scan(&mut conn, table, id).await;
    close(conn).await;
    result
}

async fn scan(conn: &mut SqliteConnection, target: &str, id: i64) -> Result<Dependents, AppError> {
    tracing::debug!(sql = %sql::LIST_USER_TABLES, "list tables");
    let tables: Vec<String> = sqlx::query_scalar(sql::LIST_USER_TABLES).fetch_all(&mut *conn).await?;

    let mut out = Dependents::new();
    for t in tables {
        match referencing_rows(conn, &t, target, id).await {
            Ok(rows) if !rows.is_empty() => {
                let entry = out.entry(t).or_default();
                entry.extend(rows);
                entry.truncate(DEPENDENTS_LIMIT as usize);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(table = %t, error = %e, "skipping table in dependents scan");
            }
        }
    }
    Ok(out)
}

async fn referencing_rows(
    conn: &mut SqliteConnection,
    table: &str,
    target: &str,
    id: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let pragma = sql::foreign_key_list(table);
    let fks = sqlx::query(&pragma).fetch_all(&mut *conn).await?;

    let mut rows = Vec::new();
    for fk in fks {
        let parent: String = fk.try_get("table")?;
        if !parent.eq_ignore_ascii_case(target) {
            continue;
        }
        let from: String = fk.try_get("from")?;
        let found = rows_for_key(conn, table, &from, id).await;
        keep_key_rows(&mut rows, table, &from, found);
    }
    Ok(rows)
}

async fn rows_for_key(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    id: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let q = sql::select_referencing(table, column, DEPENDENTS_LIMIT);
    tracing::debug!(sql = %q, id, "dependents");
    let found = sqlx::query(&q).bind(id).fetch_all(&mut *conn).await?;
    Ok(found.iter().map(row_to_json).collect())
}

/// Merge one key's lookup into the table's rows. A failed key is logged and skipped;
/// a row referencing the target through several keys is listed once.
fn keep_key_rows(rows: &mut Vec<Value>, table: &str, column: &str, found: Result<Vec<Value>, sqlx::Error>) {
    match found {
        Ok(found) => {
            for row in found {
                if !rows.contains(&row) {
                    rows.push(row);
                }
            }
        }
        Err(e) => {
            tracing::warn!(table, column, error = %e, "skipping foreign key in dependents scan");
        }
    }
}
