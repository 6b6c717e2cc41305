//! Axum HTTP server for the dashboard API.
//!
//! Handles all API routes: client and project CRUD, dashboard aggregates,
//! and health.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{Method, StatusCode, header},
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::oneshot;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::db::{
    ClientStore as _, CreateClientParams, CreateProjectParams, Database, ProjectStatus,
    ProjectStore as _,
};
use crate::error::{ServerError, StoreError};
use crate::stats::{self, TimeFilter};
use crate::web::types::*;

/// Shared state for all API handlers.
pub struct AppState {
    /// Record store the handlers read and write through.
    pub db: Arc<dyn Database>,
    /// Shutdown signal sender.
    pub shutdown_tx: tokio::sync::RwLock<Option<oneshot::Sender<()>>>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            shutdown_tx: tokio::sync::RwLock::new(None),
        }
    }
}

/// Error tuple returned by every handler. The JSON body keeps the
/// `{"error": ...}` shape the frontend expects.
type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_body(message: impl Into<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: message.into(),
    })
}

/// Map a store failure onto the HTTP surface. Storage details never leak to
/// the client; they go to the log instead.
fn store_error(err: StoreError) -> ApiError {
    match &err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, error_body(err.to_string())),
        StoreError::Validation(_) => (StatusCode::BAD_REQUEST, error_body(err.to_string())),
        StoreError::Storage(_) => {
            tracing::error!("request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Internal server error"),
            )
        }
    }
}

/// Start the API HTTP server.
///
/// Returns the actual bound `SocketAddr` (useful when binding to port 0).
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<AppState>,
    cors_origin: Option<&str>,
) -> Result<SocketAddr, ServerError> {
    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::StartupFailed {
                reason: format!("failed to bind to {}: {}", addr, e),
            })?;
    let bound_addr = listener
        .local_addr()
        .map_err(|e| ServerError::StartupFailed {
            reason: format!("failed to get local addr: {}", e),
        })?;

    let cors = cors_layer(cors_origin)?;

    let app = Router::new()
        .route("/api/health", get(health_handler))
        // Clients
        .route(
            "/api/clients",
            get(clients_list_handler).post(clients_create_handler),
        )
        .route(
            "/api/clients/{id}",
            put(clients_update_handler).delete(clients_delete_handler),
        )
        // Projects
        .route(
            "/api/projects",
            get(projects_list_handler).post(projects_create_handler),
        )
        .route(
            "/api/projects/{id}",
            put(projects_update_handler).delete(projects_delete_handler),
        )
        .route(
            "/api/projects/{id}/complete",
            post(projects_complete_handler),
        )
        // Aggregates
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/earnings", get(earnings_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .with_state(state.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    *state.shutdown_tx.write().await = Some(shutdown_tx);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("API server shutting down");
            })
            .await
        {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(bound_addr)
}

/// CORS for the frontend: an explicit origin when configured, otherwise any.
/// Only the methods and header the dashboard actually sends.
fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, ServerError> {
    let allow_origin = match origin {
        Some(raw) => {
            let value =
                raw.parse::<header::HeaderValue>()
                    .map_err(|_| ServerError::StartupFailed {
                        reason: format!("invalid CORS origin '{}'", raw),
                    })?;
            AllowOrigin::exact(value)
        }
        None => AllowOrigin::any(),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE])))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "clientdesk",
    })
}

// --- Clients ---

fn parse_required_field(field_name: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body(format!("'{}' is required", field_name)),
        ));
    }
    Ok(trimmed.to_string())
}

fn client_params_from_payload(payload: ClientPayload) -> Result<CreateClientParams, ApiError> {
    Ok(CreateClientParams {
        name: parse_required_field("name", &payload.name)?,
        email: payload.email.trim().to_string(),
        phone: payload.phone.trim().to_string(),
        lead_source: payload.lead.trim().to_string(),
    })
}

async fn clients_list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = state.db.list_clients().await.map_err(store_error)?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

async fn clients_create_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let params = client_params_from_payload(payload)?;
    let record = state.db.create_client(&params).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn clients_update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<ClientResponse>, ApiError> {
    let params = client_params_from_payload(payload)?;
    let record = state
        .db
        .update_client(id, &params)
        .await
        .map_err(store_error)?;
    Ok(Json(record.into()))
}

async fn clients_delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_client(id).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Projects ---

fn parse_status_field(value: Option<&str>) -> Result<ProjectStatus, ApiError> {
    match value {
        // New projects start in planning unless told otherwise.
        None => Ok(ProjectStatus::Planning),
        Some(raw) => ProjectStatus::from_db_value(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                error_body(format!("'{}' is not a valid status", raw)),
            )
        }),
    }
}

fn parse_deadline_field(value: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = value.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            error_body("'deadline' is required"),
        )
    })?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            error_body("'deadline' must be in YYYY-MM-DD format"),
        )
    })
}

fn parse_fee_field(value: Option<f64>) -> Result<Decimal, ApiError> {
    match value {
        None => Ok(Decimal::ZERO),
        Some(raw) => Decimal::try_from(raw).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                error_body("'fee' must be a valid number"),
            )
        }),
    }
}

fn project_params_from_payload(payload: ProjectPayload) -> Result<CreateProjectParams, ApiError> {
    Ok(CreateProjectParams {
        name: parse_required_field("name", &payload.name)?,
        client_name: payload.client.trim().to_string(),
        status: parse_status_field(payload.status.as_deref())?,
        deadline: parse_deadline_field(payload.deadline.as_deref())?,
        fee: parse_fee_field(payload.fee)?,
    })
}

async fn projects_list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = state.db.list_projects().await.map_err(store_error)?;
    Ok(Json(
        projects.into_iter().map(ProjectResponse::from).collect(),
    ))
}

async fn projects_create_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProjectPayload>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let params = project_params_from_payload(payload)?;
    let record = state
        .db
        .create_project(&params)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn projects_update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectPayload>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let params = project_params_from_payload(payload)?;
    let record = state
        .db
        .update_project(id, &params)
        .await
        .map_err(store_error)?;
    Ok(Json(record.into()))
}

async fn projects_delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_project(id).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn projects_complete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let record = state
        .db
        .set_project_status(id, ProjectStatus::Completed)
        .await
        .map_err(store_error)?;
    Ok(Json(record.into()))
}

// --- Aggregates ---

fn filter_from_query(query: &TimeFilterQuery) -> TimeFilter {
    query
        .time_filter
        .as_deref()
        .map(TimeFilter::from_query_value)
        .unwrap_or(TimeFilter::All)
}

async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let summary = stats::dashboard_summary(state.db.as_ref())
        .await
        .map_err(store_error)?;
    Ok(Json(summary.into()))
}

async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimeFilterQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    let filter = filter_from_query(&query);
    let summary = stats::stats_summary(state.db.as_ref(), filter, Utc::now().date_naive())
        .await
        .map_err(store_error)?;
    Ok(Json(summary.into()))
}

async fn earnings_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimeFilterQuery>,
) -> Result<Json<Vec<PeriodEarningsResponse>>, ApiError> {
    let filter = filter_from_query(&query);
    let periods = stats::earnings_by_period(state.db.as_ref(), filter, Utc::now().date_naive())
        .await
        .map_err(store_error)?;
    Ok(Json(
        periods.into_iter().map(PeriodEarningsResponse::from).collect(),
    ))
}
