//! Server error boundary
//!
//! Any 5xx response is itself recorded as a `server`-category error. A
//! failure while recording is swallowed so it can never mask the response
//! that triggered it.

use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::domain::OccurrenceData;

use super::AppState;

pub async fn log_server_failures(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    if response.status().is_server_error() {
        let status = response.status();
        let data = OccurrenceData {
            context: Some(format!("{method} {path}")),
            http_status: Some(status.as_u16() as i64),
            ..Default::default()
        };

        let message = format!("{method} {path} returned {status}");
        if let Err(err) = state
            .store
            .log_error("server", "InternalServerError", &message, data)
            .await
        {
            tracing::debug!(error = %err, "failed to record server error");
        }
    }

    response
}
