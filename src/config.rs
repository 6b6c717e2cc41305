//! Service configuration resolved from CLI flags and environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// Embedded SQLite file via libSQL. The production default.
    LibSql,
    /// Process-local tables. Nothing survives a restart.
    Memory,
}

impl DatabaseBackend {
    pub fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "libsql" | "sqlite" => Ok(Self::LibSql),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue {
                key: "CLIENTDESK_BACKEND".to_string(),
                message: format!("unsupported backend '{other}'"),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LibSql => "libsql",
            Self::Memory => "memory",
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// Path of the embedded database file. Ignored by the memory backend.
    pub libsql_path: PathBuf,
}

/// Resolved settings for one service process.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub database: DatabaseConfig,
    /// Origin allowed for cross-origin browser requests. `None` allows any
    /// origin, matching a dashboard served from an arbitrary dev host.
    pub cors_origin: Option<String>,
}

/// Default location of the embedded database file, under the platform data
/// directory (falls back to the working directory when unavailable).
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clientdesk")
        .join("clientdesk.db")
}
