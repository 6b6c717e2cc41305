//! Storage abstraction for dashboard records.
//!
//! A backend-agnostic `Database` trait unifies all persistence operations.
//! Two implementations exist:
//!
//! - `libsql` (default feature): embedded SQLite file, the production store
//! - `memory`: mutex-guarded tables for tests and throwaway dev runs
//!
//! Handlers and the aggregation layer consume `Arc<dyn Database>` so either
//! backend can be substituted without touching them.

#[cfg(feature = "libsql")]
pub mod libsql;

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::error::StoreError;

/// Create a database backend from configuration, initialize its schema, and
/// return it as a trait object.
pub async fn connect_from_config(config: &DatabaseConfig) -> Result<Arc<dyn Database>, StoreError> {
    match config.backend {
        #[cfg(feature = "libsql")]
        DatabaseBackend::LibSql => {
            let backend = libsql::LibSqlBackend::new_local(&config.libsql_path).await?;
            backend.init_schema().await?;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "libsql"))]
        DatabaseBackend::LibSql => Err(StoreError::Storage(
            "libsql backend not compiled in; enable the 'libsql' feature".to_string(),
        )),
        DatabaseBackend::Memory => {
            let backend = memory::MemoryBackend::new();
            backend.init_schema().await?;
            Ok(Arc::new(backend))
        }
    }
}

/// Project lifecycle state.
///
/// Stored and serialized as the display strings the dashboard UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "Planning")]
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "Planning" => Some(Self::Planning),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Stored client row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// How the client was acquired. Advisory free text; the UI offers
    /// LinkedIn, Website, Direct Email, Referral and Other, but any string
    /// is stored verbatim.
    pub lead_source: String,
}

/// Stored project row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub name: String,
    /// Client display name. Free text, not a foreign key; deleting a client
    /// leaves projects referencing its name untouched.
    pub client_name: String,
    pub status: ProjectStatus,
    pub deadline: NaiveDate,
    pub fee: Decimal,
}

/// Fields accepted when creating or replacing a client.
#[derive(Debug, Clone)]
pub struct CreateClientParams {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub lead_source: String,
}

/// Fields accepted when creating or replacing a project.
#[derive(Debug, Clone)]
pub struct CreateProjectParams {
    pub name: String,
    pub client_name: String,
    pub status: ProjectStatus,
    pub deadline: NaiveDate,
    pub fee: Decimal,
}

pub(crate) fn validate_client_params(input: &CreateClientParams) -> Result<(), StoreError> {
    if input.name.trim().is_empty() {
        return Err(StoreError::Validation(
            "client name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_project_params(input: &CreateProjectParams) -> Result<(), StoreError> {
    if input.name.trim().is_empty() {
        return Err(StoreError::Validation(
            "project name cannot be empty".to_string(),
        ));
    }
    if input.fee < Decimal::ZERO {
        return Err(StoreError::Validation(
            "project fee cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Client CRUD operations.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Every stored client, ordered by id ascending.
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StoreError>;

    /// Persist a new client under a fresh identifier and return the stored
    /// record. Identifiers are never reused, even after deletion.
    async fn create_client(&self, input: &CreateClientParams)
    -> Result<ClientRecord, StoreError>;

    /// Replace every non-id field of an existing client.
    /// Fails with `StoreError::NotFound` when the id is absent.
    async fn update_client(
        &self,
        id: i64,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, StoreError>;

    /// Remove a client. Fails with `StoreError::NotFound` when the id is
    /// absent, so repeated deletes of the same id are reported.
    async fn delete_client(&self, id: i64) -> Result<(), StoreError>;
}

/// Project CRUD operations plus the status transition used by the
/// "mark completed" action.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Every stored project, ordered by id ascending.
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, StoreError>;

    async fn create_project(
        &self,
        input: &CreateProjectParams,
    ) -> Result<ProjectRecord, StoreError>;

    /// Replace every non-id field of an existing project.
    async fn update_project(
        &self,
        id: i64,
        input: &CreateProjectParams,
    ) -> Result<ProjectRecord, StoreError>;

    async fn delete_project(&self, id: i64) -> Result<(), StoreError>;

    /// Change only the status field of an existing project.
    async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
    ) -> Result<ProjectRecord, StoreError>;
}

/// Unified persistence surface consumed by handlers and aggregation.
#[async_trait]
pub trait Database: ClientStore + ProjectStore + Send + Sync {
    /// Create tables when missing. Safe to call repeatedly.
    async fn init_schema(&self) -> Result<(), StoreError>;
}
