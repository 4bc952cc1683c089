//! Load the table registry from the built-in transport schema or a JSON file.

use crate::config::resolved::{ResolvedColumn, ResolvedTable, SchemaRegistry};
use crate::config::{validate, SchemaConfig};
use crate::error::{AppError, ConfigError};
use std::collections::HashSet;
use std::path::Path;

const TRANSPORT_SCHEMA: &str = include_str!("transport.json");

/// The ten-table transport registry shipped with the crate.
pub fn builtin_schema() -> Result<SchemaConfig, ConfigError> {
    parse_schema(TRANSPORT_SCHEMA)
}

pub fn parse_schema(json: &str) -> Result<SchemaConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

pub async fn load_from_path(path: &Path) -> Result<SchemaConfig, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_schema(&raw)
}

/// Registry for the server: the JSON file at `path` when given, otherwise the built-in one.
/// Load and validation failures surface as `AppError::Config`.
pub async fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry, AppError> {
    let config = match path {
        Some(p) => load_from_path(p).await?,
        None => builtin_schema()?,
    };
    Ok(resolve(&config)?)
}

/// Build the runtime registry (validates first).
pub fn resolve(config: &SchemaConfig) -> Result<SchemaRegistry, ConfigError> {
    validate(config)?;

    let tables = config
        .tables
        .iter()
        .map(|t| {
            let required: HashSet<&str> = t.required.iter().map(String::as_str).collect();
            let unique: HashSet<&str> = t.unique.iter().map(String::as_str).collect();
            let columns = t
                .columns
                .iter()
                .map(|c| ResolvedColumn {
                    name: c.name.clone(),
                    sql_type: c.sql_type,
                    required: required.contains(c.name.as_str()),
                    unique: unique.contains(c.name.as_str()),
                    kind: t.types.get(&c.name).copied(),
                    references: c.references.clone(),
                })
                .collect();
            ResolvedTable {
                name: t.name.clone(),
                pk: "id".into(),
                columns,
            }
        })
        .collect();

    Ok(SchemaRegistry::new(tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldKind;

    #[test]
    fn builtin_schema_resolves_ten_tables() {
        let registry = resolve(&builtin_schema().unwrap()).unwrap();
        let names: Vec<&str> = registry.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Ruta", "Parada", "RutaParadas", "Bus", "Chofer", "Cliente", "Servicio", "Tarifa", "Boleto", "Pago"
            ]
        );
    }

    #[test]
    fn resolved_metadata_follows_config() {
        let registry = resolve(&builtin_schema().unwrap()).unwrap();
        let servicio = registry.table("Servicio").unwrap();
        let required: Vec<&str> = servicio.required().map(|c| c.name.as_str()).collect();
        assert_eq!(required, ["codigo", "ruta_id", "bus_id", "chofer_id", "fecha_salida"]);
        assert_eq!(servicio.column("fecha_llegada").unwrap().kind, Some(FieldKind::Datetime));
        assert_eq!(servicio.column("ruta_id").unwrap().references.as_ref().unwrap().column, "id");
        assert!(servicio.has_column("id"));
        assert!(!servicio.has_column("hora_salida"));

        let chofer = registry.table("Chofer").unwrap();
        assert_eq!(chofer.typed().next().map(|(c, k)| (c.name.as_str(), k)), Some(("rut", FieldKind::Rut)));
        assert!(registry.table("ruta").is_none());
    }

    #[tokio::test]
    async fn load_registry_reports_config_errors() {
        let registry = load_registry(None).await.unwrap();
        assert_eq!(registry.tables().len(), 10);

        let dir = tempfile::tempdir().unwrap();
        let err = load_registry(Some(&dir.path().join("absent.json"))).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Load(_))), "{err:?}");
        assert_eq!(err.code(), "config_error");

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"tables":[{"name":"Ruta","columns":[{"name":"codigo"}],"required":["nombre"]}]}"#)
            .unwrap();
        let err = load_registry(Some(&path)).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::MissingReference { .. })), "{err:?}");
    }
}
