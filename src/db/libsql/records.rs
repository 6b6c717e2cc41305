//! Client and project store implementations over libSQL.

use std::str::FromStr;

use chrono::NaiveDate;
use libsql::params;
use rust_decimal::Decimal;

use crate::db::{
    ClientRecord, ClientStore, CreateClientParams, CreateProjectParams, ProjectRecord,
    ProjectStatus, ProjectStore, validate_client_params, validate_project_params,
};
use crate::error::StoreError;

use super::{LibSqlBackend, get_i64, get_text};

const CLIENT_COLUMNS: &str = "id, name, email, phone, lead_source";
const PROJECT_COLUMNS: &str = "id, name, client_name, status, deadline, fee";

fn parse_status(raw: &str) -> Result<ProjectStatus, StoreError> {
    ProjectStatus::from_db_value(raw)
        .ok_or_else(|| StoreError::Storage(format!("invalid project status '{}'", raw)))
}

fn parse_deadline(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| StoreError::Storage(format!("invalid project deadline '{}': {}", raw, e)))
}

fn parse_fee(raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw)
        .map_err(|e| StoreError::Storage(format!("invalid project fee '{}': {}", raw, e)))
}

fn row_to_client_record(row: &libsql::Row) -> Result<ClientRecord, StoreError> {
    Ok(ClientRecord {
        id: get_i64(row, 0),
        name: get_text(row, 1),
        email: get_text(row, 2),
        phone: get_text(row, 3),
        lead_source: get_text(row, 4),
    })
}

fn row_to_project_record(row: &libsql::Row) -> Result<ProjectRecord, StoreError> {
    let status_raw = get_text(row, 3);
    Ok(ProjectRecord {
        id: get_i64(row, 0),
        name: get_text(row, 1),
        client_name: get_text(row, 2),
        status: parse_status(&status_raw)?,
        deadline: parse_deadline(&get_text(row, 4))?,
        fee: parse_fee(&get_text(row, 5))?,
    })
}

impl LibSqlBackend {
    async fn fetch_client(
        &self,
        conn: &libsql::Connection,
        id: i64,
        context: &str,
    ) -> Result<ClientRecord, StoreError> {
        let row = conn
            .query(
                &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1 LIMIT 1"),
                params![id],
            )
            .await?
            .next()
            .await?
            .ok_or_else(|| StoreError::Storage(format!("failed to load {} client", context)))?;
        row_to_client_record(&row)
    }

    async fn fetch_project(
        &self,
        conn: &libsql::Connection,
        id: i64,
        context: &str,
    ) -> Result<ProjectRecord, StoreError> {
        let row = conn
            .query(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1 LIMIT 1"),
                params![id],
            )
            .await?
            .next()
            .await?
            .ok_or_else(|| StoreError::Storage(format!("failed to load {} project", context)))?;
        row_to_project_record(&row)
    }
}

#[async_trait::async_trait]
impl ClientStore for LibSqlBackend {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, StoreError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                &format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id ASC"),
                (),
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_client_record(&row)?);
        }
        Ok(out)
    }

    async fn create_client(
        &self,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, StoreError> {
        validate_client_params(input)?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO clients (name, email, phone, lead_source) VALUES (?1, ?2, ?3, ?4)",
            params![
                input.name.trim(),
                input.email.as_str(),
                input.phone.as_str(),
                input.lead_source.as_str(),
            ],
        )
        .await?;

        let id = conn.last_insert_rowid();
        self.fetch_client(&conn, id, "created").await
    }

    async fn update_client(
        &self,
        id: i64,
        input: &CreateClientParams,
    ) -> Result<ClientRecord, StoreError> {
        validate_client_params(input)?;

        let conn = self.connect()?;
        let updated = conn
            .execute(
                "UPDATE clients SET name = ?2, email = ?3, phone = ?4, lead_source = ?5 \
                 WHERE id = ?1",
                params![
                    id,
                    input.name.trim(),
                    input.email.as_str(),
                    input.phone.as_str(),
                    input.lead_source.as_str(),
                ],
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "client",
                id,
            });
        }

        self.fetch_client(&conn, id, "updated").await
    }

    async fn delete_client(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let deleted = conn
            .execute("DELETE FROM clients WHERE id = ?1", params![id])
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound {
                entity: "client",
                id,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectStore for LibSqlBackend {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id ASC"),
                (),
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_project_record(&row)?);
        }
        Ok(out)
    }

    async fn create_project(
        &self,
        input: &CreateProjectParams,
    ) -> Result<ProjectRecord, StoreError> {
        validate_project_params(input)?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO projects (name, client_name, status, deadline, fee) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.name.trim(),
                input.client_name.as_str(),
                input.status.as_str(),
                input.deadline.format("%Y-%m-%d").to_string(),
                input.fee.to_string(),
            ],
        )
        .await?;

        let id = conn.last_insert_rowid();
        self.fetch_project(&conn, id, "created").await
    }

    async fn update_project(
        &self,
        id: i64,
        input: &CreateProjectParams,
    ) -> Result<ProjectRecord, StoreError> {
        validate_project_params(input)?;

        let conn = self.connect()?;
        let updated = conn
            .execute(
                "UPDATE projects SET name = ?2, client_name = ?3, status = ?4, deadline = ?5, \
                 fee = ?6 WHERE id = ?1",
                params![
                    id,
                    input.name.trim(),
                    input.client_name.as_str(),
                    input.status.as_str(),
                    input.deadline.format("%Y-%m-%d").to_string(),
                    input.fee.to_string(),
                ],
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "project",
                id,
            });
        }

        self.fetch_project(&conn, id, "updated").await
    }

    async fn delete_project(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let deleted = conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])
            .await?;
        if deleted == 0 {
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
        let conn = self.connect()?;
        let updated = conn
            .execute(
                "UPDATE projects SET status = ?2 WHERE id = ?1",
                params![id, status.as_str()],
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "project",
                id,
            });
        }

        self.fetch_project(&conn, id, "updated").await
    }
}
