//! Process settings from the environment.

use std::net::SocketAddr;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/schema_crud";
const DEFAULT_MODELS_PATH: &str = "models";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// Directory of `*.json` model definitions.
    pub models_path: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Request body cap for entity routes.
    pub max_body_bytes: usize,
}

impl Settings {
    /// Read `DATABASE_URL`, `MODELS_PATH`, `BIND_ADDR`, `DB_MAX_CONNECTIONS`, `MAX_BODY_BYTES`.
    /// Unset or unparseable values use defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));
        Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            models_path: lookup("MODELS_PATH").unwrap_or_else(|| DEFAULT_MODELS_PATH.into()),
            bind_addr,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            max_body_bytes: lookup("MAX_BODY_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        }
    }
}
