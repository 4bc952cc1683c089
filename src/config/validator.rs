//! Registry validation: identifiers, column references and foreign keys.

use crate::config::SchemaConfig;
use crate::error::ConfigError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Identifiers are interpolated into SQL, so only plain names are accepted.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

fn check_identifier(s: &str) -> Result<(), ConfigError> {
    if is_identifier(s) && !s.to_lowercase().starts_with("sqlite_") {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(s.to_string()))
    }
}

pub fn validate(config: &SchemaConfig) -> Result<(), ConfigError> {
    if config.tables.is_empty() {
        return Err(ConfigError::Validation("at least one table required".into()));
    }

    let mut columns_by_table: HashMap<&str, HashSet<&str>> = HashMap::new();
    for t in &config.tables {
        check_identifier(&t.name)?;
        if columns_by_table.contains_key(t.name.as_str()) {
            return Err(ConfigError::Duplicate {
                kind: "table",
                name: t.name.clone(),
            });
        }
        let mut names = HashSet::new();
        for c in &t.columns {
            check_identifier(&c.name)?;
            if c.name == "id" {
                return Err(ConfigError::Validation(format!(
                    "{}: 'id' is the implicit primary key and cannot be declared",
                    t.name
                )));
            }
            if !names.insert(c.name.as_str()) {
                return Err(ConfigError::Duplicate {
                    kind: "column",
                    name: format!("{}.{}", t.name, c.name),
                });
            }
        }
        columns_by_table.insert(t.name.as_str(), names);
    }

    for t in &config.tables {
        let cols = &columns_by_table[t.name.as_str()];
        let listed = t
            .required
            .iter()
            .chain(t.unique.iter())
            .chain(t.types.keys());
        for name in listed {
            if !cols.contains(name.as_str()) {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    name: format!("{}.{}", t.name, name),
                });
            }
        }
        for c in &t.columns {
            let Some(fk) = &c.references else { continue };
            let target = columns_by_table
                .get(fk.table.as_str())
                .ok_or_else(|| ConfigError::MissingReference {
                    kind: "table",
                    name: fk.table.clone(),
                })?;
            if fk.column != "id" && !target.contains(fk.column.as_str()) {
                return Err(ConfigError::MissingReference {
                    kind: "column",
                    name: format!("{}.{}", fk.table, fk.column),
                });
            }
        }
    }

    Ok(())
}
