//! Form submissions to typed field maps: integer casting by field name, date + time pairing.

use crate::config::ResolvedTable;
use serde_json::Value;
use std::collections::HashMap;

/// Name fragments that mark a field as an integer.
const INTEGER_HINTS: &[&str] = &["id", "monto", "asiento", "precio", "capacidad", "orden"];
/// Name fragments that veto integer casting.
const TEMPORAL_HINTS: &[&str] = &["fecha", "date", "hora", "time"];

/// Heuristic: numeric-looking names, never date or time fields.
pub fn is_integer_field(name: &str) -> bool {
    let name = name.to_lowercase();
    if TEMPORAL_HINTS.iter().any(|k| name.contains(k)) {
        return false;
    }
    INTEGER_HINTS.iter().any(|k| name.contains(k))
}

/// Cast a raw form value: empty is dropped, integer fields become numbers when they parse.
pub fn cast(name: &str, raw: &str) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    if is_integer_field(name) {
        if let Ok(n) = raw.trim().parse::<i64>() {
            return Some(Value::Number(n.into()));
        }
    }
    Some(Value::String(raw.to_string()))
}

/// Time companion of a date field: `fecha_salida` pairs with `hora_salida`.
pub fn time_companion(name: &str) -> Option<String> {
    name.starts_with("fecha").then(|| name.replacen("fecha", "hora", 1))
}

/// Collect the table's editable columns from a submitted form.
/// A non-empty date with a non-empty time companion becomes `"<date> <time>"`.
/// Keys that are not editable columns (including time companions) are ignored.
pub fn collect_fields(table: &ResolvedTable, form: &HashMap<String, String>) -> HashMap<String, Value> {
    let mut out = HashMap::new();
    for col in &table.columns {
        let Some(raw) = form.get(&col.name) else { continue };
        let mut raw = raw.clone();
        if !raw.trim().is_empty() {
            let time = time_companion(&col.name)
                .and_then(|t| form.get(&t))
                .map(|t| t.trim())
                .filter(|t| !t.is_empty());
            if let Some(time) = time {
                raw = format!("{} {}", raw.trim(), time);
            }
        }
        if let Some(v) = cast(&col.name, &raw) {
            out.insert(col.name.clone(), v);
        }
    }
    out
}

/// Exact-match filters from query parameters; only known columns, empty values skipped.
pub fn collect_filters(table: &ResolvedTable, params: &HashMap<String, String>) -> Vec<(String, Value)> {
    let mut filters: Vec<(String, Value)> = table
        .select_columns()
        .into_iter()
        .filter_map(|c| {
            let raw = params.get(c)?;
            cast(c, raw).map(|v| (c.to_string(), v))
        })
        .collect();
    filters.sort_by(|a, b| a.0.cmp(&b.0));
    filters
}
