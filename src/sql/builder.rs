//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resolved table.

use crate::config::ResolvedTable;
use crate::error::AppError;
use serde_json::Value;
use std::collections::HashMap;

/// Hard cap on rows returned by a single SELECT.
pub const MAX_LIMIT: u32 = 1000;

/// Quote identifier for SQLite (safe: only from the registry or store metadata).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) {
        self.params.push(v);
    }
}

/// `"a" = ? AND "b" = ?` for the given equality filters; params pushed in filter order.
fn where_clause(q: &mut QueryBuf, filters: &[(String, Value)]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = filters
        .iter()
        .map(|(col, val)| {
            q.push_param(val.clone());
            format!("{} = ?", quoted(col))
        })
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

/// Write statements must be keyed and may only name registry columns.
fn checked_filters(table: &ResolvedTable, filters: &[(String, Value)]) -> Result<(), AppError> {
    if filters.is_empty() {
        return Err(AppError::BadRequest(format!(
            "refusing unconditioned write on {}",
            table.name
        )));
    }
    if let Some((col, _)) = filters.iter().find(|(c, _)| !table.has_column(c)) {
        return Err(AppError::BadRequest(format!("unknown column '{}' in {}", col, table.name)));
    }
    Ok(())
}

/// SELECT with optional column projection and exact-match filters, ORDER BY pk, optional LIMIT.
/// Columns and filters not in the table are dropped. `None` columns selects `id` plus editable columns.
pub fn select(
    table: &ResolvedTable,
    columns: Option<&[&str]>,
    filters: &[(String, Value)],
    limit: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols: Vec<&str> = match columns {
        Some(cols) => cols.iter().copied().filter(|c| table.has_column(c)).collect(),
        None => Vec::new(),
    };
    let cols = if cols.is_empty() { table.select_columns() } else { cols };
    let col_list = cols.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ");

    let known: Vec<(String, Value)> = filters
        .iter()
        .filter(|(c, _)| table.has_column(c))
        .cloned()
        .collect();
    let where_sql = where_clause(&mut q, &known);
    let limit_sql = limit
        .map(|n| format!(" LIMIT {}", n.min(MAX_LIMIT)))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}",
        col_list,
        quoted(&table.name),
        where_sql,
        quoted(&table.pk),
        limit_sql
    );
    q
}

/// INSERT of the editable columns present in body, in declaration order.
pub fn insert(table: &ResolvedTable, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    for c in &table.columns {
        if let Some(v) = body.get(&c.name) {
            q.push_param(v.clone());
            cols.push(quoted(&c.name));
        }
    }
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quoted(&table.name))
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quoted(&table.name),
            cols.join(", "),
            vec!["?"; cols.len()].join(", ")
        )
    };
    q
}

/// UPDATE: SET only editable columns present in body, WHERE the given filters.
pub fn update(
    table: &ResolvedTable,
    body: &HashMap<String, Value>,
    filters: &[(String, Value)],
) -> Result<QueryBuf, AppError> {
    checked_filters(table, filters)?;
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &table.columns {
        if let Some(v) = body.get(&c.name) {
            q.push_param(v.clone());
            sets.push(format!("{} = ?", quoted(&c.name)));
        }
    }
    if sets.is_empty() {
        return Err(AppError::Validation(format!("no fields to update in {}", table.name)));
    }
    let where_sql = where_clause(&mut q, filters);
    q.sql = format!("UPDATE {} SET {}{}", quoted(&table.name), sets.join(", "), where_sql);
    Ok(q)
}

pub fn delete(table: &ResolvedTable, filters: &[(String, Value)]) -> Result<QueryBuf, AppError> {
    checked_filters(table, filters)?;
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, filters);
    q.sql = format!("DELETE FROM {}{}", quoted(&table.name), where_sql);
    Ok(q)
}

/// CREATE TABLE IF NOT EXISTS with NOT NULL / UNIQUE / FOREIGN KEY from the registry.
pub fn create_table(table: &ResolvedTable) -> String {
    let mut defs = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(&table.pk))];
    for c in &table.columns {
        let mut def = format!("{} {}", quoted(&c.name), c.sql_type.as_sql());
        if c.required {
            def.push_str(" NOT NULL");
        }
        if c.unique {
            def.push_str(" UNIQUE");
        }
        defs.push(def);
    }
    for c in &table.columns {
        if let Some(fk) = &c.references {
            defs.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                quoted(&c.name),
                quoted(&fk.table),
                quoted(&fk.column)
            ));
        }
    }
    format!("CREATE TABLE IF NOT EXISTS {} ({})", quoted(&table.name), defs.join(", "))
}

pub const LIST_USER_TABLES: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

pub fn foreign_key_list(table: &str) -> String {
    format!("PRAGMA foreign_key_list({})", quoted(table))
}

/// All columns of rows in `table` whose `column` equals the single bound param.
pub fn select_referencing(table: &str, column: &str, limit: u32) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = ? LIMIT {}",
        quoted(table),
        quoted(column),
        limit
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_schema, resolve, SchemaRegistry};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        resolve(&builtin_schema().unwrap()).unwrap()
    }

    #[test]
    fn insert_binds_only_present_columns_in_order() {
        let reg = registry();
        let ruta = reg.table("Ruta").unwrap();
        let body: HashMap<String, Value> = [
            ("destino".to_string(), json!("B")),
            ("codigo".to_string(), json!("R1")),
        ]
        .into_iter()
        .collect();
        let q = insert(ruta, &body);
        assert_eq!(q.sql, r#"INSERT INTO "Ruta" ("codigo", "destino") VALUES (?, ?)"#);
        assert_eq!(q.params, vec![json!("R1"), json!("B")]);
    }

    #[test]
    fn select_drops_unknown_columns_and_caps_limit() {
        let reg = registry();
        let ruta = reg.table("Ruta").unwrap();
        let filters = vec![
            ("codigo".to_string(), json!("R1")),
            ("nope".to_string(), json!(1)),
        ];
        let q = select(ruta, Some(&["id", "codigo", "nope"][..]), &filters, Some(5000));
        assert_eq!(
            q.sql,
            r#"SELECT "id", "codigo" FROM "Ruta" WHERE "codigo" = ? ORDER BY "id" LIMIT 1000"#
        );
        assert_eq!(q.params, vec![json!("R1")]);
    }

    #[test]
    fn update_places_condition_params_last() {
        let reg = registry();
        let ruta = reg.table("Ruta").unwrap();
        let body: HashMap<String, Value> = [("nombre".to_string(), json!("Sur"))].into_iter().collect();
        let q = update(ruta, &body, &[("id".to_string(), json!(7))]).unwrap();
        assert_eq!(q.sql, r#"UPDATE "Ruta" SET "nombre" = ? WHERE "id" = ?"#);
        assert_eq!(q.params, vec![json!("Sur"), json!(7)]);
    }

    #[test]
    fn writes_require_a_known_condition() {
        let reg = registry();
        let ruta = reg.table("Ruta").unwrap();
        assert!(matches!(delete(ruta, &[]), Err(AppError::BadRequest(_))));
        assert!(matches!(
            delete(ruta, &[("x\" OR 1=1 --".to_string(), json!(1))]),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            update(ruta, &HashMap::new(), &[("id".to_string(), json!(1))]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn create_table_carries_constraints() {
        let reg = registry();
        let ddl = create_table(reg.table("Pago").unwrap());
        assert!(ddl.starts_with(r#"CREATE TABLE IF NOT EXISTS "Pago" ("id" INTEGER PRIMARY KEY AUTOINCREMENT"#));
        assert!(ddl.contains(r#""boleto_id" INTEGER NOT NULL UNIQUE"#));
        assert!(ddl.contains(r#""fecha_pago" TEXT,"#));
        assert!(ddl.contains(r#"FOREIGN KEY ("boleto_id") REFERENCES "Boleto"("id")"#));
    }

    #[test]
    fn quoted_escapes_embedded_quotes() {
        assert_eq!(quoted(r#"a"b"#), r#""a""b""#);
    }
}
