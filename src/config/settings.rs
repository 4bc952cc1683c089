//! Process settings from the environment (after `.env` is loaded).

use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "base_de_datos_transportes.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct Settings {
    /// SQLite file backing all ten tables. From `DATABASE_PATH`.
    pub database_path: PathBuf,
    /// From `BIND_ADDR`.
    pub bind_addr: String,
    /// Optional JSON registry replacing the built-in one. From `SCHEMA_PATH`.
    pub schema_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into())
                .into(),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            schema_path: std::env::var("SCHEMA_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }
}
