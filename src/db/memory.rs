//! In-memory storage backend.
//!
//! Mutex-guarded tables with monotonic id counters. The counters only ever
//! increment, so deleted identifiers are never handed out again, matching
//! the libSQL backend's AUTOINCREMENT behavior. Used by tests and by
//! `--backend memory` for throwaway runs.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::db::{
    ClientRecord, ClientStore, CreateClientParams, CreateProjectParams, Database, ProjectRecord,
    ProjectStatus, ProjectStore, validate_client_params, validate_project_params,
};
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    clients: Vec<ClientRecord>,
    projects: Vec<ProjectRecord>,
}

pub struct MemoryBackend {
    tables: Mutex<Tables>,
    next_client_id: AtomicI64,
    next_project_id: AtomicI64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            next_client_id: AtomicI64::new(1),
            next_project_id: AtomicI64::new(1),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Storage("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientStore for MemoryBackend {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StoreError> {
        // Rows are appended in id order and updates happen in place, so the
        // vector is already sorted by id.
        Ok(self.tables()?.clients.clone())
    }

    async fn create_client(
        &self,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, StoreError> {
        validate_client_params(input)?;

        // Allocate the id while holding the table lock so append order is
        // always id order.
        let mut tables = self.tables()?;
        let record = ClientRecord {
            id: self.next_client_id.fetch_add(1, Ordering::Relaxed),
            name: input.name.trim().to_string(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            lead_source: input.lead_source.clone(),
        };
        tables.clients.push(record.clone());
        Ok(record)
    }

    async fn update_client(
        &self,
        id: i64,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, StoreError> {
        validate_client_params(input)?;

        let mut tables = self.tables()?;
        let Some(existing) = tables.clients.iter_mut().find(|c| c.id == id) else {
            return Err(StoreError::NotFound {
                entity: "client",
                id,
            });
        };
        existing.name = input.name.trim().to_string();
        existing.email = input.email.clone();
        existing.phone = input.phone.clone();
        existing.lead_source = input.lead_source.clone();
        Ok(existing.clone())
    }

    async fn delete_client(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let before = tables.clients.len();
        tables.clients.retain(|c| c.id != id);
        if tables.clients.len() == before {
            return Err(StoreError::NotFound {
                entity: "client",
                id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryBackend {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.tables()?.projects.clone())
    }

    async fn create_project(
        &self,
        input: &CreateProjectParams,
    ) -> Result<ProjectRecord, StoreError> {
        validate_project_params(input)?;

        let mut tables = self.tables()?;
        let record = ProjectRecord {
            id: self.next_project_id.fetch_add(1, Ordering::Relaxed),
            name: input.name.trim().to_string(),
            client_name: input.client_name.clone(),
            status: input.status,
            deadline: input.deadline,
            fee: input.fee,
        };
        tables.projects.push(record.clone());
        Ok(record)
    }

    async fn update_project(
        &self,
        id: i64,
        input: &CreateProjectParams,
    ) -> Result<ProjectRecord, StoreError> {
        validate_project_params(input)?;

        let mut tables = self.tables()?;
        let Some(existing) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Err(StoreError::NotFound {
                entity: "project",
                id,
            });
        };
        existing.name = input.name.trim().to_string();
        existing.client_name = input.client_name.clone();
        existing.status = input.status;
        existing.deadline = input.deadline;
        existing.fee = input.fee;
        Ok(existing.clone())
    }

    async fn delete_project(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        if tables.projects.len() == before {
            return Err(StoreError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }

    async fn set_project_status(
        &self,
        id: i64,
        status: ProjectStatus,
    ) -> Result<ProjectRecord, StoreError> {
        let mut tables = self.tables()?;
        let Some(existing) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Err(StoreError::NotFound {
                entity: "project",
                id,
            });
        };
        existing.status = status;
        Ok(existing.clone())
    }
}

#[async_trait]
impl Database for MemoryBackend {
    async fn init_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::error::StoreError;
    use crate::testing::{sample_client, sample_project};

    use super::*;

    #[tokio::test]
    async fn ids_stay_unique_after_delete() {
        let db = MemoryBackend::new();

        let first = db
            .create_client(&sample_client("Acme Corp"))
            .await
            .expect("create client");
        db.delete_client(first.id).await.expect("delete client");
        let second = db
            .create_client(&sample_client("Beta LLC"))
            .await
            .expect("create replacement");

        assert!(second.id > first.id);
        let listed = db.list_clients().await.expect("list clients");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Beta LLC");
    }

    #[tokio::test]
    async fn update_replaces_record_wholesale() {
        let db = MemoryBackend::new();
        let deadline = NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date");

        let created = db
            .create_project(&sample_project(
                "Logo design",
                "Acme Corp",
                ProjectStatus::Planning,
                deadline,
                dec!(400),
            ))
            .await
            .expect("create project");

        let new_deadline = NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date");
        let updated = db
            .update_project(
                created.id,
                &sample_project(
                    "Logo redesign",
                    "Acme Corp",
                    ProjectStatus::InProgress,
                    new_deadline,
                    dec!(550),
                ),
            )
            .await
            .expect("update project");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Logo redesign");
        assert_eq!(updated.status, ProjectStatus::InProgress);
        assert_eq!(updated.deadline, new_deadline);
        assert_eq!(updated.fee, dec!(550));

        let listed = db.list_projects().await.expect("list projects");
        assert_eq!(listed, vec![updated]);
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let db = MemoryBackend::new();

        let err = db.delete_project(42).await.expect_err("must fail");
        assert!(matches!(
            err,
            StoreError::NotFound {
                entity: "project",
                id: 42
            }
        ));

        let err = db
            .set_project_status(42, ProjectStatus::Completed)
            .await
            .expect_err("must fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
