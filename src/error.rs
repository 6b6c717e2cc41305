//! Error types shared across the service.

use thiserror::Error;

/// Failures surfaced by the record store and the aggregation layer.
///
/// The web layer maps these onto HTTP statuses: `NotFound` becomes 404,
/// `Validation` becomes 400, `Storage` becomes 500.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted record does not exist (or was already deleted).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Input failed type coercion or a basic field rule.
    #[error("{0}")]
    Validation(String),

    /// The underlying storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(feature = "libsql")]
impl From<libsql::Error> for StoreError {
    fn from(err: libsql::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Bootstrap-time configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// HTTP server lifecycle failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to start http server: {reason}")]
    StartupFailed { reason: String },
}
