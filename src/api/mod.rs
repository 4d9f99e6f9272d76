//! HTTP API for Faultline
//!
//! Thin adapter over the store: handlers translate requests into store calls
//! and wrap results in the uniform `{success, ...}` envelope.

mod boundary;
mod errors;
mod ingest;
mod routes;
mod state;

pub use routes::build_router;
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::StoreError;

/// Minimal `{success}` envelope for operations with no payload.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub success: bool,
}

/// Failure envelope: `{success: false, error: "..."}`.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

impl FailureBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Store(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, FailureBody::new(msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, FailureBody::new(msg)),
            AppError::Store(err) => {
                // Storage details never leak to the caller
                tracing::error!(error = %err, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FailureBody::new("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}
