//! libSQL (embedded SQLite) storage backend.
//!
//! One local database file holds both record tables. Identifier assignment
//! relies on `INTEGER PRIMARY KEY AUTOINCREMENT`, which SQLite guarantees to
//! be monotonic and never reused after deletion. Write serialization is
//! delegated to SQLite's own locking.

mod records;

use std::path::Path;

use crate::db::Database;
use crate::error::StoreError;

const CREATE_CLIENTS_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS clients (\
      id INTEGER PRIMARY KEY AUTOINCREMENT,\
      name TEXT NOT NULL,\
      email TEXT NOT NULL DEFAULT '',\
      phone TEXT NOT NULL DEFAULT '',\
      lead_source TEXT NOT NULL DEFAULT ''\
    )";

// fee and deadline are stored as TEXT: Decimal round-trips exactly through
// its string form, and deadlines are calendar dates without a time zone.
const CREATE_PROJECTS_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS projects (\
      id INTEGER PRIMARY KEY AUTOINCREMENT,\
      name TEXT NOT NULL,\
      client_name TEXT NOT NULL DEFAULT '',\
      status TEXT NOT NULL,\
      deadline TEXT NOT NULL,\
      fee TEXT NOT NULL DEFAULT '0'\
    )";

/// Embedded SQLite database backed by a local file.
pub struct LibSqlBackend {
    db: libsql::Database,
}

impl LibSqlBackend {
    /// Open (or create) a local database file, creating parent directories
    /// as needed.
    pub async fn new_local(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let db = libsql::Builder::new_local(path).build().await?;
        Ok(Self { db })
    }

    pub(crate) fn connect(&self) -> Result<libsql::Connection, StoreError> {
        Ok(self.db.connect()?)
    }
}

#[async_trait::async_trait]
impl Database for LibSqlBackend {
    async fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(CREATE_CLIENTS_TABLE, ()).await?;
        conn.execute(CREATE_PROJECTS_TABLE, ()).await?;
        Ok(())
    }
}

pub(crate) fn get_text(row: &libsql::Row, idx: i32) -> String {
    row.get_str(idx).unwrap_or_default().to_string()
}

pub(crate) fn get_i64(row: &libsql::Row, idx: i32) -> i64 {
    row.get::<i64>(idx).unwrap_or_default()
}
