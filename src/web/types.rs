//! Request and response DTOs for the dashboard API.
//!
//! Field names follow the wire contract the frontend expects: clients expose
//! their lead source as `lead`, projects expose their client as `client`, and
//! the summary objects are camelCase.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{ClientRecord, ProjectRecord, ProjectStatus};
use crate::stats::{DashboardSummary, PeriodEarnings, StatsSummary};

// --- Clients ---

/// Body for `POST /api/clients` and `PUT /api/clients/{id}`.
///
/// Everything defaults to empty so a sparse body is accepted; only `name` is
/// validated as required downstream.
#[derive(Debug, Deserialize)]
pub struct ClientPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub lead: String,
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub lead: String,
}

impl From<ClientRecord> for ClientResponse {
    fn from(record: ClientRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            lead: record.lead_source,
        }
    }
}

// --- Projects ---

/// Body for `POST /api/projects` and `PUT /api/projects/{id}`.
///
/// Typed fields come in raw and are coerced by the handler so a bad status or
/// date yields a 400 with a field-specific message instead of a rejected body.
#[derive(Debug, Deserialize)]
pub struct ProjectPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub fee: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i64,
    pub name: String,
    pub client: String,
    pub status: ProjectStatus,
    pub deadline: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            client: record.client_name,
            status: record.status,
            deadline: record.deadline,
            fee: record.fee,
        }
    }
}

// --- Aggregates ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub client_count: usize,
    pub project_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_earnings: Decimal,
    pub active_project_count: usize,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            client_count: summary.client_count,
            project_count: summary.project_count,
            total_earnings: summary.total_earnings,
            active_project_count: summary.active_project_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_earnings: Decimal,
    pub projects_completed: usize,
    pub active_clients: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_project_value: Decimal,
}

impl From<StatsSummary> for StatsResponse {
    fn from(summary: StatsSummary) -> Self {
        Self {
            total_earnings: summary.total_earnings,
            projects_completed: summary.projects_completed,
            active_clients: summary.active_clients,
            average_project_value: summary.average_project_value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PeriodEarningsResponse {
    pub year: i32,
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub earnings: Decimal,
}

impl From<PeriodEarnings> for PeriodEarningsResponse {
    fn from(period: PeriodEarnings) -> Self {
        Self {
            year: period.year,
            month: period.month,
            earnings: period.earnings,
        }
    }
}

/// Query string for `GET /api/stats` and `GET /api/earnings`.
#[derive(Debug, Deserialize)]
pub struct TimeFilterQuery {
    #[serde(default, rename = "timeFilter")]
    pub time_filter: Option<String>,
}

// --- Errors / health ---

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}
