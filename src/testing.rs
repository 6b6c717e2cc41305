//! Shared helpers for tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::{CreateClientParams, CreateProjectParams, Database, ProjectStatus};

/// Fresh libsql store backed by a throwaway directory. Keep the `TempDir`
/// alive for the duration of the test; dropping it deletes the database file.
#[cfg(feature = "libsql")]
pub async fn test_db() -> (Arc<dyn Database>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let backend = crate::db::libsql::LibSqlBackend::new_local(tmp.path().join("test.db"))
        .await
        .expect("open test database");
    backend.init_schema().await.expect("create tables");
    (Arc::new(backend), tmp)
}

/// Fresh in-memory store.
pub fn memory_db() -> Arc<dyn Database> {
    Arc::new(crate::db::memory::MemoryBackend::new())
}

pub fn sample_client(name: &str) -> CreateClientParams {
    CreateClientParams {
        name: name.to_string(),
        email: "ops@acme.example".to_string(),
        phone: "555-0100".to_string(),
        lead_source: "Referral".to_string(),
    }
}

pub fn sample_project(
    name: &str,
    client: &str,
    status: ProjectStatus,
    deadline: NaiveDate,
    fee: Decimal,
) -> CreateProjectParams {
    CreateProjectParams {
        name: name.to_string(),
        client_name: client.to_string(),
        status,
        deadline,
        fee,
    }
}
