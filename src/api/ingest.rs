//! Ingest routes: backend and frontend error reports

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domain::{ConsoleLogEntry, OccurrenceData};

use super::{AppState, StatusBody};

/// One backend error report. Missing identity fields fall back to generic
/// values so a half-formed report is still captured.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogErrorRequest {
    pub category: Option<String>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub context: Option<String>,
    pub stack_trace: Option<String>,
    pub extra_data: Option<serde_json::Map<String, serde_json::Value>>,
}

pub async fn log_backend_error(
    State(state): State<AppState>,
    Json(req): Json<LogErrorRequest>,
) -> (StatusCode, Json<StatusBody>) {
    let category = req.category.as_deref().unwrap_or("server");
    let error_type = req.error_type.as_deref().unwrap_or("Error");
    let error_message = req.error_message.as_deref().unwrap_or("Unknown error");

    let mut data = OccurrenceData {
        context: req.context.clone(),
        stack_trace: req.stack_trace.clone(),
        extra_data: req.extra_data.clone(),
        ..Default::default()
    };

    // Lift well-known request fields out of the free-form payload
    if let Some(extra) = &req.extra_data {
        data.request_url = extra
            .get("url")
            .and_then(|v| v.as_str())
            .map(String::from);
        data.http_status = extra.get("status").and_then(|v| v.as_i64());
    }

    match state
        .store
        .log_error(category, error_type, error_message, data)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(StatusBody { success: true })),
        Err(err) => {
            tracing::error!(error = %err, "failed to store backend error report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusBody { success: false }),
            )
        }
    }
}

/// One collector-captured frontend error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FrontendErrorReport {
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub source: Option<String>,
    pub page_url: Option<String>,
    pub console_logs: Option<Vec<ConsoleLogEntry>>,
    pub request_url: Option<String>,
    pub http_status: Option<i64>,
    pub response_body: Option<String>,
    pub user_agent: Option<String>,
    pub viewport: Option<serde_json::Value>,
    pub extra_data: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FrontendBatchRequest {
    pub errors: Vec<FrontendErrorReport>,
}

#[derive(Debug, Serialize)]
pub struct FrontendBatchResponse {
    pub success: bool,
    pub logged: usize,
}

pub async fn log_frontend_errors(
    State(state): State<AppState>,
    Json(batch): Json<FrontendBatchRequest>,
) -> Json<FrontendBatchResponse> {
    let mut logged = 0;

    for report in batch.errors {
        let error_type = report.error_type.as_deref().unwrap_or("FrontendError");
        let error_message = report.error_message.as_deref().unwrap_or("Unknown error");

        let mut extra = serde_json::Map::new();
        if let Some(user_agent) = &report.user_agent {
            extra.insert("user_agent".to_string(), serde_json::json!(user_agent));
        }
        if let Some(viewport) = &report.viewport {
            extra.insert("viewport".to_string(), viewport.clone());
        }
        if let Some(stack) = report.extra_data.as_ref().and_then(|m| m.get("stack")) {
            extra.insert("stack".to_string(), stack.clone());
        }

        let data = OccurrenceData {
            source: report.source.clone(),
            page_url: report.page_url.clone(),
            console_logs: report.console_logs.clone(),
            request_url: report.request_url.clone(),
            http_status: report.http_status,
            response_body: report.response_body.clone(),
            extra_data: (!extra.is_empty()).then_some(extra),
            ..Default::default()
        };

        // Per-item failures are swallowed; the batch keeps going
        match state
            .store
            .log_error("frontend", error_type, error_message, data)
            .await
        {
            Ok(_) => logged += 1,
            Err(err) => {
                tracing::warn!(error = %err, "failed to store frontend error report");
            }
        }
    }

    Json(FrontendBatchResponse {
        success: true,
        logged,
    })
}
