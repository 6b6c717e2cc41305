//! HTTP API layer.
//!
//! `server` holds the axum router, handlers, and startup; `types` holds the
//! request/response DTOs that pin the wire contract.

pub mod server;
pub mod types;

pub use server::{AppState, start_server};
